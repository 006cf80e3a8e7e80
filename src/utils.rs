//! Identifier generation

use bech32::Bech32m;
use uuid7::uuid7;

pub const REQUEST_ID_HRP: &str = "req_";

// construct a unique time-ordered id then encode using bech32m
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

pub fn new_request_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(REQUEST_ID_HRP)
}
