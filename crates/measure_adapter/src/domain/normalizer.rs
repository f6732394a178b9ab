//! Reshaping of provider measurement replies into the canonical telemetry
//! records published downstream.
//!
//! Every normalizer reads the provider's `message` object, which carries the
//! line identity (`equipment`, `portAddr`, `dn`, `mac`), the administrative
//! and operational port status, and one technology-specific data section.
//! Any shape problem is reported as a [`NormalizeError`].

mod fttx;
mod xdsl;
mod xpon;

pub use fttx::*;
pub use xdsl::*;
pub use xpon::*;

use crate::domain::{
    expect_str, uppercase, DeviceDescriptor, NormalizeError, NormalizeResult, PortAddress,
    PortField,
};
use serde::Serialize;
use serde_json::{Map, Value};

static ABSENT: Value = Value::Null;

/// Signature shared by the per-technology normalizers.
pub type Normalizer = fn(&Value) -> NormalizeResult<NormalizedPayload>;

/// Canonical measurement record of one of the supported technologies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedPayload {
    Fttx(FttxMeasurement),
    Xpon(XponMeasurement),
    Xdsl(XdslMeasurement),
}

/// Line identity: device descriptor, the port fields relevant to the
/// technology, and the subscriber DN when the provider reports one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechData {
    #[serde(flatten)]
    pub device: DeviceDescriptor,
    #[serde(flatten)]
    pub port: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dn: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortMac {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<Value>,
}

/// Upper-cased port status followed by technology-specific readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSection {
    pub status_adm: String,
    pub status_oper: String,
    #[serde(flatten)]
    pub readings: Map<String, Value>,
}

fn tech_data(message: &Value, fields: &[PortField]) -> NormalizeResult<TechData> {
    let equipment = optional_str(message, "equipment")?;
    let port_addr = optional_str(message, "portAddr")?;
    let address = PortAddress::parse(port_addr);

    Ok(TechData {
        device: DeviceDescriptor::parse(equipment),
        port: fields
            .iter()
            .map(|field| {
                let (key, value) = address.field(*field);
                (key.to_string(), value)
            })
            .collect(),
        dn: message.get("dn").cloned(),
    })
}

fn port_mac(message: &Value) -> PortMac {
    PortMac {
        mac_address: message.get("mac").cloned(),
    }
}

fn status_section(message: &Value, readings: Map<String, Value>) -> NormalizeResult<StatusSection> {
    Ok(StatusSection {
        status_adm: required_upper(message, "admStatus")?,
        status_oper: required_upper(message, "operStatus")?,
        readings,
    })
}

fn required_upper(message: &Value, field: &str) -> NormalizeResult<String> {
    let value = message
        .get(field)
        .ok_or_else(|| NormalizeError::MissingField(field.to_string()))?;
    Ok(expect_str(value, field)?.to_uppercase())
}

/// A string field where `null` and absence both read as empty.
fn optional_str<'a>(message: &'a Value, field: &str) -> NormalizeResult<&'a str> {
    match message.get(field) {
        None | Some(Value::Null) => Ok(""),
        Some(value) => expect_str(value, field),
    }
}

/// The technology data section, or `null` when the reply has none.
fn data_section<'a>(message: &'a Value, section: &str) -> &'a Value {
    message.get(section).unwrap_or(&ABSENT)
}

/// A list nested in the technology data section.
fn section_list<'a>(message: &'a Value, section: &str, field: &str) -> NormalizeResult<&'a [Value]> {
    let data = message
        .get(section)
        .filter(|data| !data.is_null())
        .ok_or_else(|| NormalizeError::MissingField(section.to_string()))?;
    let path = format!("{section}.{field}");
    data.get(field)
        .ok_or_else(|| NormalizeError::MissingField(path.clone()))?
        .as_array()
        .map(Vec::as_slice)
        .ok_or(NormalizeError::NotAList(path))
}

/// Applies `convert` to every value of a record, keeping key order.
fn convert_values<F>(record: &Map<String, Value>, mut convert: F) -> NormalizeResult<Map<String, Value>>
where
    F: FnMut(&str, &Value) -> NormalizeResult<Value>,
{
    record
        .iter()
        .map(|(key, value)| Ok((key.clone(), convert(key, value)?)))
        .collect()
}

/// Fields of a list element; anything other than an object has none.
fn element_record(element: &Value) -> Map<String, Value> {
    element.as_object().cloned().unwrap_or_default()
}

/// Copies the named fields of `record`, in the order given.
fn pick(record: &Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|field| {
            record
                .get(*field)
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect()
}

/// Every field of `record` except the named ones, in record order.
fn omit(record: &Map<String, Value>, fields: &[&str]) -> Map<String, Value> {
    record
        .iter()
        .filter(|(key, _)| !fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn uppercase_field(key: &str, value: &Value) -> NormalizeResult<Value> {
    uppercase(value, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tech_data_selects_port_fields() {
        let message = json!({
            "equipment": "[OLT] HUAWEI MA5800 X7",
            "portAddr": "10.1.1.1:-0/2/5 GPON 14",
            "dn": "4951112233"
        });

        let tech = tech_data(
            &message,
            &[PortField::IpAddress, PortField::Slot, PortField::Port],
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&tech).unwrap(),
            json!({
                "type": "OLT",
                "vendor": "HUAWEI",
                "model": "X7",
                "ip_address": "10.1.1.1",
                "slot": 2,
                "port": 5,
                "dn": "4951112233"
            })
        );
    }

    #[test]
    fn test_tech_data_tolerates_missing_identity() {
        let tech = tech_data(&json!({}), &[PortField::IpAddress, PortField::OntId]).unwrap();

        assert_eq!(
            serde_json::to_value(&tech).unwrap(),
            json!({"type": "", "vendor": "", "model": "", "ip_address": "", "ont_id": null})
        );
    }

    #[test]
    fn test_tech_data_rejects_non_string_equipment() {
        let error = tech_data(&json!({"equipment": 5}), &[]).unwrap_err();

        assert_eq!(error, NormalizeError::NotAString("equipment".to_string()));
    }

    #[test]
    fn test_status_section_requires_status_strings() {
        let error = status_section(&json!({"admStatus": "up"}), Map::new()).unwrap_err();

        assert_eq!(error, NormalizeError::MissingField("operStatus".to_string()));
    }

    #[test]
    fn test_section_list_reports_path() {
        let message = json!({"fttxData": {"sRules": "none"}});

        assert_eq!(
            section_list(&message, "fttxData", "sRules").unwrap_err(),
            NormalizeError::NotAList("fttxData.sRules".to_string())
        );
        assert_eq!(
            section_list(&json!({}), "fttxData", "sRules").unwrap_err(),
            NormalizeError::MissingField("fttxData".to_string())
        );
    }

    #[test]
    fn test_pick_follows_field_order() {
        let record = json!({"duplex": "full", "speed": 1, "other": 2});
        let picked = pick(record.as_object().unwrap(), &["speed", "duplex"]);

        assert_eq!(
            picked.keys().collect::<Vec<_>>(),
            vec!["speed", "duplex"]
        );
    }
}
