mod export_ctf_token;
mod export_sdtid_token;
mod export_v3_token;

pub(crate) use export_ctf_token::encode_ctf_token;
pub(crate) use export_sdtid_token::{encode_sdtid_token, issue_sdtid_token};
pub(crate) use export_v3_token::encode_v3_token;
