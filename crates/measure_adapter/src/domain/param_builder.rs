use crate::domain::{
    display_value, is_falsy, AdapterError, FieldMapper, FilialDirectory, KeyTable,
    ProviderParams, TaskRequest, PROVIDER_COMMAND_TIMEOUT,
};
use serde_json::Map;

/// Optional address parameters forwarded when no customer DN is given.
pub const ADDRESS_PARAMS: &KeyTable = &[
    ("equipment_ip_address", "ip"),
    ("shelf", "shelf"),
    ("equipment_slot", "slot"),
    ("equipment_port", "port"),
    ("equipment_ont_id", "ontId"),
    ("ont_pon_sn", "ontPonSN"),
];

const ADDRESS_MAPPER: FieldMapper = FieldMapper::drop_falsy(ADDRESS_PARAMS);

/// Builds the provider command for a measurement task. A customer DN, when
/// present, identifies the line on its own; otherwise the non-empty address
/// parameters do.
pub fn build_measure_params(
    request: &TaskRequest,
    filials: &FilialDirectory,
) -> Result<ProviderParams, AdapterError> {
    let parameters = request.parameters().as_object().ok_or_else(|| {
        AdapterError::Execution("request parameters are not an object".to_string())
    })?;

    let dn = parameters
        .get(&filials.customer_dn_key())
        .filter(|dn| !is_falsy(dn))
        .cloned();
    let address = match dn {
        Some(_) => Map::new(),
        None => ADDRESS_MAPPER.map_record(parameters),
    };

    let id = request
        .id()
        .map_or_else(|| "undefined".to_string(), display_value);

    Ok(ProviderParams {
        timeout: PROVIDER_COMMAND_TIMEOUT,
        dn,
        req_id: format!("{id}-data"),
        operator: request.user_id().clone(),
        filial_id: filials.lookup(request.region_id()).cloned(),
        address,
    })
}
