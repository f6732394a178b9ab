use super::{
    convert_values, data_section, element_record, omit, pick, port_mac, section_list,
    status_section, tech_data, NormalizedPayload, PortMac, StatusSection, TechData,
};
use crate::domain::{
    number_or_uppercase, number_value, parse_int, to_megabits, to_number, transpose,
    FieldMapper, KeyTable, NormalizeResult, PortField,
};
use serde::Serialize;
use serde_json::{Map, Value};

const SECTION: &str = "fttxData";

pub const FTTX_FIELDS: &KeyTable = &[
    ("negotiation", "negotiation"),
    ("speed", "speed"),
    ("duplex", "duplex"),
    ("length", "length"),
    ("atuc_CRCErrors", "atuc_crc_errors"),
    ("atur_CRCErrors", "atur_crc_errors"),
    ("atuc_DropErrors", "atuc_drop_errors"),
    ("atur_DropErrors", "atur_drop_errors"),
    ("atuc_IgnoreErrors", "atuc_ignore_errors"),
    ("atur_IgnoreErrors", "atur_ignore_errors"),
    ("atuc_RuntErrors", "atuc_runt_errors"),
    ("atur_RuntErrors", "atur_runt_errors"),
    ("atuc_JabberErrors", "atuc_jabber_errors"),
    ("atur_JabberErrors", "atur_jabber_errors"),
    ("atuc_GiantErrors", "atuc_giant_errors"),
    ("atur_GiantErrors", "atur_giant_errors"),
    ("atuc_JumboErrors", "atuc_jumbo_errors"),
    ("atur_JumboErrors", "atur_jumbo_errors"),
    ("atuc_Collision", "atuc_collision"),
    ("atur_Collision", "atur_collision"),
];

const FTTX_MAPPER: FieldMapper = FieldMapper::keep_falsy(FTTX_FIELDS).omitting(&["sRules"]);

const TECH_FIELDS: &[PortField] = &[PortField::IpAddress, PortField::Slot, PortField::Port];

const STATUS_FIELDS: &[&str] = &["negotiation", "speed", "duplex", "length"];

const TOWARD_SUBSCRIBER: (&str, &str) = ("atuc_", "К абоненту");
const FROM_SUBSCRIBER: (&str, &str) = ("atur_", "От абонента");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FttxMeasurement {
    pub tech_data: TechData,
    pub interface_status: StatusSection,
    pub interface_counters: Map<String, Value>,
    pub port_mac: PortMac,
    pub port_vlan: VlanColumns,
}

/// Outer (service) and inner (customer) VLAN of every rule, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VlanColumns {
    pub vlan_upper: Vec<Value>,
    pub vlan_lower: Vec<Value>,
}

pub fn normalize_fttx(message: &Value) -> NormalizeResult<NormalizedPayload> {
    let tech_data = tech_data(message, TECH_FIELDS)?;
    let fields = FTTX_MAPPER.map(data_section(message, SECTION));

    let readings = convert_values(&pick(&fields, STATUS_FIELDS), interface_reading)?;
    let interface_status = status_section(message, readings)?;
    let interface_counters = interface_counters(&omit(&fields, STATUS_FIELDS));
    let port_vlan = port_vlan(section_list(message, SECTION, "sRules")?)?;

    Ok(NormalizedPayload::Fttx(FttxMeasurement {
        tech_data,
        interface_status,
        interface_counters,
        port_mac: port_mac(message),
        port_vlan,
    }))
}

/// Link speed arrives in bit/s and is reported in Mbit/s.
fn interface_reading(key: &str, value: &Value) -> NormalizeResult<Value> {
    match to_number(value) {
        Some(speed) if key == "speed" => Ok(number_value(to_megabits(speed))),
        _ => number_or_uppercase(value, key),
    }
}

/// Splits the counters by direction and lays them out as two-element
/// columns: toward the subscriber first, from the subscriber second.
fn interface_counters(fields: &Map<String, Value>) -> Map<String, Value> {
    let direction = |(prefix, label): (&str, &str)| {
        let mut record = Map::new();
        record.insert("direction".to_string(), Value::String(label.to_string()));
        for (key, value) in fields {
            if key.contains(prefix) {
                let counter = parse_int(value).map_or(Value::Null, Value::from);
                record.insert(key.replacen(prefix, "", 1), counter);
            }
        }
        record
    };

    transpose([direction(TOWARD_SUBSCRIBER), direction(FROM_SUBSCRIBER)])
}

fn port_vlan(rules: &[Value]) -> NormalizeResult<VlanColumns> {
    let mut columns = VlanColumns::default();
    for rule in rules {
        let rule = convert_values(&element_record(rule), number_or_uppercase_field)?;
        columns.vlan_upper.push(rule.get("svlan").cloned().unwrap_or(Value::Null));
        columns.vlan_lower.push(rule.get("vlan").cloned().unwrap_or(Value::Null));
    }
    Ok(columns)
}

fn number_or_uppercase_field(key: &str, value: &Value) -> NormalizeResult<Value> {
    number_or_uppercase(value, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NormalizeError;
    use serde_json::json;

    fn reply() -> Value {
        json!({
            "cmdState": "OK",
            "cmdStatus": "DONE",
            "equipment": "[SW] Eltex MES2324 B",
            "portAddr": "10.20.30.40:-1/0/7",
            "dn": "4957654321",
            "mac": "00:11:22:33:44:55",
            "admStatus": "up",
            "operStatus": "down",
            "fttxData": {
                "duplex": "full",
                "speed": "1000000000",
                "negotiation": "auto",
                "length": "",
                "atuc_CRCErrors": "12",
                "atur_CRCErrors": "3",
                "atuc_DropErrors": "n/a",
                "atur_DropErrors": 0,
                "unknown": "skip",
                "sRules": [
                    {"svlan": "100", "vlan": "1001", "mode": "tag"},
                    {"svlan": 200, "vlan": "2002"}
                ]
            }
        })
    }

    fn normalize(message: &Value) -> Value {
        serde_json::to_value(normalize_fttx(message).unwrap()).unwrap()
    }

    #[test]
    fn test_normalize_fttx() {
        assert_eq!(
            normalize(&reply()),
            json!({
                "tech_data": {
                    "type": "SW",
                    "vendor": "ELTEX",
                    "model": "B",
                    "ip_address": "10.20.30.40",
                    "slot": null,
                    "port": 7,
                    "dn": "4957654321"
                },
                "interface_status": {
                    "status_adm": "UP",
                    "status_oper": "DOWN",
                    "negotiation": "AUTO",
                    "speed": 1000,
                    "duplex": "FULL",
                    "length": 0
                },
                "interface_counters": {
                    "direction": ["К абоненту", "От абонента"],
                    "crc_errors": [12, 3],
                    "drop_errors": [null, 0]
                },
                "port_mac": {"mac_address": "00:11:22:33:44:55"},
                "port_vlan": {
                    "vlan_upper": [100, 200],
                    "vlan_lower": [1001, 2002]
                }
            })
        );
    }

    #[test]
    fn test_speed_is_rounded_to_two_decimals() {
        let mut message = reply();
        message["fttxData"]["speed"] = json!(123456789);

        assert_eq!(normalize(&message)["interface_status"]["speed"], json!(123.46));
    }

    #[test]
    fn test_counters_without_readings_keep_direction_column() {
        let mut message = reply();
        message["fttxData"] = json!({"sRules": []});

        let payload = normalize(&message);
        assert_eq!(
            payload["interface_counters"],
            json!({"direction": ["К абоненту", "От абонента"]})
        );
        assert_eq!(payload["port_vlan"], json!({"vlan_upper": [], "vlan_lower": []}));
    }

    #[test]
    fn test_vlan_columns_follow_rule_order() {
        let mut message = reply();
        message["fttxData"]["sRules"] = json!([
            {"svlan": "3", "vlan": "30"},
            {"vlan": "40"},
            {"svlan": "5", "vlan": "50"}
        ]);

        assert_eq!(
            normalize(&message)["port_vlan"],
            json!({"vlan_upper": [3, null, 5], "vlan_lower": [30, 40, 50]})
        );
    }

    #[test]
    fn test_missing_rules_fail() {
        let mut message = reply();
        message["fttxData"].as_object_mut().unwrap().remove("sRules");

        assert_eq!(
            normalize_fttx(&message).unwrap_err(),
            NormalizeError::MissingField("fttxData.sRules".to_string())
        );
    }

    #[test]
    fn test_non_string_status_reading_fails() {
        let mut message = reply();
        message["fttxData"]["duplex"] = json!({"mode": "full"});

        assert_eq!(
            normalize_fttx(&message).unwrap_err(),
            NormalizeError::NotAString("duplex".to_string())
        );
    }
}
