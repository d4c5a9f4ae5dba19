//! Builders for Amazon Connect contact-flow invocation payloads.

use serde_json::{Value, json};

/// Phone number used across fixtures.
pub const TEST_ADDRESS: &str = "+15551234567";

/// A contact-flow event carrying `entry_code` as typed by the caller
/// and `address` as the caller's endpoint.
pub fn connect_event(entry_code: &str, address: &str) -> Value {
    json!({
        "Details": {
            "ContactData": {
                "Channel": "VOICE",
                "CustomerEndpoint": {
                    "Address": address,
                    "Type": "TELEPHONE_NUMBER"
                },
                "InitiationMethod": "INBOUND"
            },
            "Parameters": {
                "EntryCode": entry_code
            }
        },
        "Name": "ContactFlowEvent"
    })
}

/// A contact-flow event with no customer endpoint (e.g. a withheld number).
pub fn connect_event_without_address(entry_code: &str) -> Value {
    json!({
        "Details": {
            "ContactData": {
                "Channel": "VOICE"
            },
            "Parameters": {
                "EntryCode": entry_code
            }
        },
        "Name": "ContactFlowEvent"
    })
}
