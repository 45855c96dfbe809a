// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::{ClientConfig, config_path};
use crate::utils::pretty_table;

/// `init`: writes flags and session details into the config file, keeping
/// whatever the file already had otherwise.
pub fn init(root: &clap::ArgMatches, sub: &clap::ArgMatches) -> Result<PathBuf> {
    let path = match root.get_one::<String>("config") {
        Some(p) => PathBuf::from(p),
        None => config_path()?,
    };
    let mut cfg = ClientConfig::load_or_default(&path)?;
    cfg.apply_cli(root);
    if let Some(user_id) = sub.get_one::<i64>("user-id") {
        cfg.session.user_id = *user_id;
    }
    if let Some(username) = sub.get_one::<String>("username") {
        cfg.session.username = username.clone();
    }
    cfg.validate()?;
    cfg.save(&path)?;
    println!("Config written to {}", path.display());
    Ok(path)
}

pub fn handle(cfg: &ClientConfig, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("show", _)) = m.subcommand() {
        let token = if cfg.token.is_some() { "set" } else { "none" };
        let rows = vec![
            vec!["base_url".to_string(), cfg.base_url.clone()],
            vec!["timeout_secs".to_string(), cfg.timeout_secs.to_string()],
            vec!["token".to_string(), token.to_string()],
            vec!["user_id".to_string(), cfg.session.user_id.to_string()],
            vec!["username".to_string(), cfg.session.username.clone()],
        ];
        println!("{}", pretty_table(&["Key", "Value"], rows));
    }
    Ok(())
}
