use std::fs;
use std::path::Path;

use anyhow::Result;

use super::unlock_token::{current_token, load_token, unlock_token};
use crate::cli::{ReencodeArgs, TokenArgs};
use crate::enums::ExportFormat;

pub fn export_token(
    args: &TokenArgs,
    reencode: &ReencodeArgs,
    format: ExportFormat,
    template: Option<&Path>,
) -> Result<()> {
    let mut ctx = load_token(args, false)?;
    let unlocked = unlock_token(&mut ctx, args, false)?;

    let password = match &reencode.new_password {
        Some(pass) => Some(pass.clone()),
        None if reencode.keep_password => unlocked.password,
        None => None,
    };

    let token = current_token(&ctx)?;
    if format == ExportFormat::Sdtid {
        let template = template.map(fs::read_to_string).transpose()?;
        let xml = token.encode_sdtid(
            template.as_deref(),
            password.as_deref(),
            reencode.new_devid.as_deref(),
        )?;
        print!("{xml}");
        return Ok(());
    }

    let token = token.encode(
        password.as_deref(),
        reencode.new_devid.as_deref(),
        format.version(),
        format.is_smartphone(),
    )?;

    println!("{}", format.render(&token));
    Ok(())
}
