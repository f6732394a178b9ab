use crate::domain::{
    build_measure_params, normalize_fttx, normalize_xdsl, normalize_xpon, AdapterError,
    FilialDirectory, Normalizer, ProviderParams, TaskRequest,
};
use crate::schemas::RequestSchema;

pub const FTTX_MEASURE_TASK: &str = "equipment.measure.fttx";
pub const XPON_MEASURE_TASK: &str = "equipment.measure.xpon";
pub const XDSL_MEASURE_TASK: &str = "equipment.measure.xdsl";

pub const DEFAULT_PROVIDER_METHOD: &str = "measure";

/// Builds the provider command for a request.
pub type ParamBuilder = fn(&TaskRequest, &FilialDirectory) -> Result<ProviderParams, AdapterError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Fttx,
    Xpon,
    Xdsl,
}

impl TaskKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            FTTX_MEASURE_TASK => Some(TaskKind::Fttx),
            XPON_MEASURE_TASK => Some(TaskKind::Xpon),
            XDSL_MEASURE_TASK => Some(TaskKind::Xdsl),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Fttx => FTTX_MEASURE_TASK,
            TaskKind::Xpon => XPON_MEASURE_TASK,
            TaskKind::Xdsl => XDSL_MEASURE_TASK,
        }
    }
}

/// Provider method invoked for each task kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRoutes {
    pub fttx: String,
    pub xpon: String,
    pub xdsl: String,
}

impl Default for ProviderRoutes {
    fn default() -> Self {
        Self {
            fttx: DEFAULT_PROVIDER_METHOD.to_string(),
            xpon: DEFAULT_PROVIDER_METHOD.to_string(),
            xdsl: DEFAULT_PROVIDER_METHOD.to_string(),
        }
    }
}

/// Everything needed to run one kind of task.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub kind: TaskKind,
    pub schema: RequestSchema,
    pub provider_method: String,
    pub build_params: ParamBuilder,
    pub normalize: Normalizer,
}

/// The fixed set of supported tasks.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    fttx: TaskSpec,
    xpon: TaskSpec,
    xdsl: TaskSpec,
}

impl TaskRegistry {
    pub fn new(routes: &ProviderRoutes) -> Self {
        Self {
            fttx: TaskSpec {
                kind: TaskKind::Fttx,
                schema: RequestSchema::DnAction,
                provider_method: routes.fttx.clone(),
                build_params: build_measure_params,
                normalize: normalize_fttx,
            },
            xpon: TaskSpec {
                kind: TaskKind::Xpon,
                schema: RequestSchema::Dn,
                provider_method: routes.xpon.clone(),
                build_params: build_measure_params,
                normalize: normalize_xpon,
            },
            xdsl: TaskSpec {
                kind: TaskKind::Xdsl,
                schema: RequestSchema::DnAction,
                provider_method: routes.xdsl.clone(),
                build_params: build_measure_params,
                normalize: normalize_xdsl,
            },
        }
    }

    pub fn spec(&self, kind: TaskKind) -> &TaskSpec {
        match kind {
            TaskKind::Fttx => &self.fttx,
            TaskKind::Xpon => &self.xpon,
            TaskKind::Xdsl => &self.xdsl,
        }
    }

    /// Looks up the task a request names; only the exact task strings match.
    pub fn resolve(&self, request: &TaskRequest) -> Result<&TaskSpec, AdapterError> {
        request
            .task()
            .and_then(|task| task.as_str())
            .and_then(TaskKind::from_name)
            .map(|kind| self.spec(kind))
            .ok_or_else(|| AdapterError::TaskNotFound {
                task: request.task_label(),
            })
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new(&ProviderRoutes::default())
    }
}
