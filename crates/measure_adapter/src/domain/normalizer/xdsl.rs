use super::{
    convert_values, data_section, element_record, omit, pick, port_mac, section_list,
    status_section, tech_data, uppercase_field, NormalizedPayload, PortMac, StatusSection,
    TechData,
};
use crate::domain::{
    decimal_comma, expect_str, number_value, parse_number, to_megabits, to_number, transpose,
    uppercase, FieldMapper, KeyTable, NormalizeResult, PortField,
};
use serde::Serialize;
use serde_json::{Map, Value};

const SECTION: &str = "xdslData";

pub const XDSL_FIELDS: &KeyTable = &[
    ("uptime", "uptime"),
    ("pwrMgnt", "power_mode"),
    ("lineConfProfile", "profile"),
    ("atucUp_ChanTxRate", "atuc_up_tx_rate"),
    ("atucDown_ChanTxRate", "atuc_down_tx_rate"),
    ("atucUp_AttainableRate", "atuc_up_attainable_rate"),
    ("atucDown_AttainableRate", "atuc_down_attainable_rate"),
    ("atucUp_SnrMgn", "atuc_up_snr_margin"),
    ("atucDown_SnrMgn", "atuc_down_snr_margin"),
    ("atucUp_Atn", "atuc_up_atn"),
    ("atucDown_Atn", "atuc_down_atn"),
    ("atucUp_ChanInterleaveDelay", "atuc_up_interleave_delay"),
    ("atucDown_ChanInterleaveDelay", "atuc_down_interleave_delay"),
    ("atucUp_OutputPwr", "atuc_up_output_power"),
    ("atucDown_OutputPwr", "atuc_down_output_power"),
    ("atuc_OperationalMode", "atuc_operational_mode"),
    ("atuc_AdmOperationalMode", "atuc_adm_operational_mode"),
];

const MODEM_FIELDS: &KeyTable = &[
    ("vendorId", "vendor"),
    ("versionNumber", "version"),
    ("serialNumber", "serial_number"),
];

const XDSL_MAPPER: FieldMapper = FieldMapper::keep_falsy(XDSL_FIELDS).omitting(&["pvc", "modem"]);
const MODEM_MAPPER: FieldMapper = FieldMapper::keep_falsy(MODEM_FIELDS);

const TECH_FIELDS: &[PortField] = &[
    PortField::IpAddress,
    PortField::Rack,
    PortField::Slot,
    PortField::Port,
];

const INTERFACE_FIELDS: &[&str] = &["uptime", "power_mode", "profile"];

/// Line readings that stay textual.
const INFO_FIELDS: &[&str] = &["atuc_operational_mode", "atuc_adm_operational_mode"];

/// Line rates reported in bit/s, published in Mbit/s.
const RATE_FIELDS: &[&str] = &[
    "atuc_up_tx_rate",
    "atuc_down_tx_rate",
    "atuc_up_attainable_rate",
    "atuc_down_attainable_rate",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XdslMeasurement {
    pub tech_data: TechData,
    pub interface_status: StatusSection,
    pub line_status: Map<String, Value>,
    pub port_mac: PortMac,
    pub pvc: Map<String, Value>,
    pub modem: Map<String, Value>,
}

pub fn normalize_xdsl(message: &Value) -> NormalizeResult<NormalizedPayload> {
    let tech_data = tech_data(message, TECH_FIELDS)?;
    let section = data_section(message, SECTION);
    let fields = XDSL_MAPPER.map(section);

    let readings = convert_values(&pick(&fields, INTERFACE_FIELDS), interface_reading)?;
    let interface_status = status_section(message, readings)?;
    let line_status = convert_values(&omit(&fields, INTERFACE_FIELDS), line_reading)?;
    let pvc = pvc(section_list(message, SECTION, "pvc")?);
    let modem = modem(section.get("modem"))?;

    Ok(NormalizedPayload::Xdsl(XdslMeasurement {
        tech_data,
        interface_status,
        line_status,
        port_mac: port_mac(message),
        pvc,
        modem,
    }))
}

fn interface_reading(key: &str, value: &Value) -> NormalizeResult<Value> {
    match key {
        "uptime" => decimal_comma(value, key),
        _ => uppercase_field(key, value),
    }
}

fn line_reading(key: &str, value: &Value) -> NormalizeResult<Value> {
    let text = expect_str(value, key)?.replacen(',', ".", 1);
    if INFO_FIELDS.contains(&key) {
        return Ok(Value::String(text.to_uppercase()));
    }

    let number = parse_number(&text);
    Ok(match number {
        Some(rate) if RATE_FIELDS.contains(&key) => number_value(to_megabits(rate)),
        Some(reading) => number_value(reading),
        None => Value::Null,
    })
}

/// Numeric PVC attributes become numbers, the rest are kept verbatim.
fn pvc(circuits: &[Value]) -> Map<String, Value> {
    transpose(circuits.iter().map(|circuit| {
        element_record(circuit)
            .into_iter()
            .map(|(key, value)| {
                let value = to_number(&value).map_or(value, number_value);
                (key, value)
            })
            .collect::<Map<String, Value>>()
    }))
}

/// The single modem record as one-element columns.
fn modem(modem: Option<&Value>) -> NormalizeResult<Map<String, Value>> {
    modem
        .map(|modem| MODEM_MAPPER.map(modem))
        .unwrap_or_default()
        .iter()
        .map(|(key, value)| Ok((key.clone(), Value::Array(vec![uppercase(value, key)?]))))
        .collect()
}
