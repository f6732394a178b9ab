use super::{
    convert_values, data_section, port_mac, section_list, status_section, tech_data,
    uppercase_field, NormalizedPayload, PortMac, StatusSection, TechData,
};
use crate::domain::{
    coerce_number, decimal_comma, transpose, uppercase, FieldMapper, KeyTable, NormalizeResult,
    PortField,
};
use serde::Serialize;
use serde_json::{Map, Value};

const SECTION: &str = "xponData";

pub const XPON_FIELDS: &KeyTable = &[
    ("ponSerial", "ont_serial_number"),
    ("version", "ont_version"),
    ("type", "ont_type"),
    ("software", "ont_software"),
    ("distance", "ont_distance"),
    ("rssi", "ont_rssi"),
    ("rxPwr", "ont_power_rx"),
    ("txPwr", "ont_power_tx"),
];

const SERVICE_PORT_FIELDS: &KeyTable = &[
    ("id", "service_port"),
    ("status", "service_port_status"),
    ("vlan", "vlan"),
];

const ONT_PORT_FIELDS: &KeyTable = &[
    ("id", "port_number"),
    ("type", "port_type"),
    ("speed", "port_speed"),
    ("duplex", "port_duplex"),
    ("status", "port_status"),
];

const XPON_MAPPER: FieldMapper =
    FieldMapper::keep_falsy(XPON_FIELDS).omitting(&["srvRules", "ontPorts"]);
const SERVICE_PORT_MAPPER: FieldMapper = FieldMapper::keep_falsy(SERVICE_PORT_FIELDS);
const ONT_PORT_MAPPER: FieldMapper = FieldMapper::keep_falsy(ONT_PORT_FIELDS);

const TECH_FIELDS: &[PortField] = &[
    PortField::IpAddress,
    PortField::Rack,
    PortField::Slot,
    PortField::Port,
    PortField::OntId,
];

/// Optical readings reported as decimal strings, possibly with a comma
/// separator ("-21,5").
pub const DIGIT_FIELDS: &[&str] = &["ont_distance", "ont_rssi", "ont_power_rx", "ont_power_tx"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XponMeasurement {
    pub tech_data: TechData,
    pub ont_state: StatusSection,
    pub port_mac: PortMac,
    pub port_vlan: Map<String, Value>,
    pub ont_ports: Map<String, Value>,
}

pub fn normalize_xpon(message: &Value) -> NormalizeResult<NormalizedPayload> {
    let tech_data = tech_data(message, TECH_FIELDS)?;
    let fields = XPON_MAPPER.map(data_section(message, SECTION));

    let readings = convert_values(&fields, ont_reading)?;
    let ont_state = status_section(message, readings)?;
    let port_vlan = columns(
        section_list(message, SECTION, "srvRules")?,
        SERVICE_PORT_MAPPER,
        service_port_value,
    )?;
    let ont_ports = columns(
        section_list(message, SECTION, "ontPorts")?,
        ONT_PORT_MAPPER,
        ont_port_value,
    )?;

    Ok(NormalizedPayload::Xpon(XponMeasurement {
        tech_data,
        ont_state,
        port_mac: port_mac(message),
        port_vlan,
        ont_ports,
    }))
}

fn ont_reading(key: &str, value: &Value) -> NormalizeResult<Value> {
    if DIGIT_FIELDS.contains(&key) {
        decimal_comma(value, key)
    } else {
        uppercase_field(key, value)
    }
}

fn service_port_value(key: &str, value: &Value) -> NormalizeResult<Value> {
    match key {
        "service_port_status" => uppercase(value, key),
        _ => Ok(coerce_number(value)),
    }
}

fn ont_port_value(key: &str, value: &Value) -> NormalizeResult<Value> {
    match key {
        "port_number" | "port_speed" => Ok(coerce_number(value)),
        _ => uppercase(value, key),
    }
}

/// Maps and converts every element, then lays the elements out as columns.
fn columns(
    elements: &[Value],
    mapper: FieldMapper,
    convert: fn(&str, &Value) -> NormalizeResult<Value>,
) -> NormalizeResult<Map<String, Value>> {
    let records = elements
        .iter()
        .map(|element| convert_values(&mapper.map(element), convert))
        .collect::<NormalizeResult<Vec<_>>>()?;
    Ok(transpose(records))
}
