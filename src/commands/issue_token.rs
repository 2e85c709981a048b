use std::fs;
use std::path::Path;

use anyhow::Result;
use stoken::Token;

pub fn issue_token(
    template: Option<&Path>,
    new_password: Option<&str>,
    new_devid: Option<&str>,
) -> Result<()> {
    let template = template.map(fs::read_to_string).transpose()?;
    let xml = Token::issue_sdtid(template.as_deref(), new_password, new_devid)?;
    print!("{xml}");
    Ok(())
}
