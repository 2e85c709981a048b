mod parse_ctf_token;
mod parse_sdtid_token;
mod parse_token_file;
mod parse_token_string;
mod parse_v3_token;

pub(crate) use parse_ctf_token::{
    bits_to_numoutput, ctf_devid_matches, decode_ctf_token, decrypt_ctf_seed, generate_key_hash,
    set_bits, CtfBits,
};
pub(crate) use parse_sdtid_token::{decode_sdtid_token, decrypt_sdtid_seed, SdtidRecord, XmlNode};
pub use parse_token_file::parse_token_file;
pub use parse_token_string::{decode_token, parse_token_string};
pub(crate) use parse_v3_token::{
    compute_hash as v3_compute_hash, decode_v3_token, decrypt_v3_seed, derive_key as v3_derive_key,
    encode_date as v3_encode_date, payload as v3_payload, record as v3_record, scrub_devid,
    v3_devid_matches, V3Key, V3Record, V3_ADDPIN_OFF, V3_ADDPIN_ON, V3_PAYLOAD_BYTES,
};
