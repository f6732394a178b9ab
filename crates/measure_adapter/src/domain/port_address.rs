use crate::domain::parse_int_prefix;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// ONT identifier of a port address, taken from the last space-separated
/// part of the port segment (`"1/2/3 77"`, `"1/2/3 GPON 77"`).
///
/// `Null` when the address has no port segment or the identifier is not a
/// number, `Empty` when the port segment carries no identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OntId {
    #[default]
    Null,
    Empty,
    Id(i64),
}

impl Serialize for OntId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OntId::Null => serializer.serialize_none(),
            OntId::Empty => serializer.serialize_str(""),
            OntId::Id(id) => serializer.serialize_i64(*id),
        }
    }
}

/// Fields of a [`PortAddress`] that a measurement may expose in `tech_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortField {
    IpAddress,
    Rack,
    Slot,
    Port,
    OntId,
}

/// Location parsed from `"<ip>:-<rack>/<slot>/<port> <...> <ont>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortAddress {
    pub ip_address: String,
    pub rack: Option<i64>,
    pub slot: Option<i64>,
    pub port: Option<i64>,
    pub ont_id: OntId,
}

impl PortAddress {
    pub fn parse(port_addr: &str) -> Self {
        let (ip_address, port_segment) = split_segments(port_addr);
        let mut address = Self {
            ip_address: ip_address.to_string(),
            ..Self::default()
        };

        let Some(segment) = port_segment else {
            return address;
        };

        let parts: Vec<&str> = segment.split(' ').collect();
        let port_string = parts.first().copied().unwrap_or_default();
        let positions: Vec<Option<i64>> = port_string
            .split('/')
            .filter(|token| !token.is_empty())
            .map(positional)
            .collect();

        match positions.as_slice() {
            [port] => address.port = *port,
            [slot, port] => {
                address.slot = *slot;
                address.port = *port;
            }
            [rack, slot, port] => {
                address.rack = *rack;
                address.slot = *slot;
                address.port = *port;
            }
            _ => {}
        }

        address.ont_id = match parts.as_slice() {
            [_, ont] | [_, _, ont] => positional(ont).map_or(OntId::Null, OntId::Id),
            _ => OntId::Empty,
        };

        address
    }

    /// (key, value) pair for one field, as it appears in `tech_data`.
    pub fn field(&self, field: PortField) -> (&'static str, Value) {
        match field {
            PortField::IpAddress => ("ip_address", Value::String(self.ip_address.clone())),
            PortField::Rack => ("rack", self.rack.map_or(Value::Null, Value::from)),
            PortField::Slot => ("slot", self.slot.map_or(Value::Null, Value::from)),
            PortField::Port => ("port", self.port.map_or(Value::Null, Value::from)),
            PortField::OntId => (
                "ont_id",
                match self.ont_id {
                    OntId::Null => Value::Null,
                    OntId::Empty => Value::String(String::new()),
                    OntId::Id(id) => Value::from(id),
                },
            ),
        }
    }
}

/// Positional numbers treat zero like an unreadable token.
fn positional(token: &str) -> Option<i64> {
    parse_int_prefix(token).filter(|number| *number != 0)
}

/// Splits on `:-` or `:*`, returning the text before the first delimiter and
/// the text between the first and the second one.
fn split_segments(port_addr: &str) -> (&str, Option<&str>) {
    let bytes = port_addr.as_bytes();
    let mut delimiters = port_addr
        .match_indices(':')
        .map(|(index, _)| index)
        .filter(|index| matches!(bytes.get(index + 1), Some(b'-' | b'*')));

    let Some(first) = delimiters.next() else {
        return (port_addr, None);
    };
    let segment_end = delimiters.next().unwrap_or(port_addr.len());

    (&port_addr[..first], Some(&port_addr[first + 2..segment_end]))
}
