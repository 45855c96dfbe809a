// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

use crate::models::{CouponFrequency, DayCountBasis, GracePeriodType, InterestRateType, Payer};

pub fn build_cli() -> Command {
    Command::new("bondclip")
        .version(crate_version!())
        .about("Corporate bond projections backed by a remote pricing service")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Config file (defaults to the platform config dir)"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Base URL of the bond service"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .help("Bearer token for authenticated requests"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Request timeout in seconds"),
        )
        .subcommand(
            Command::new("init")
                .about("Write the config file")
                .arg(
                    Arg::new("user-id")
                        .long("user-id")
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("username").long("username")),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect configuration")
                .subcommand(Command::new("show").about("Print the effective configuration")),
        )
        .subcommand(
            Command::new("bond")
                .about("Manage bond projections")
                .subcommand(Command::new("list").args(output_args()))
                .subcommand(
                    Command::new("show")
                        .about("Bond with its issuance cost")
                        .arg(id_arg("id"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("find")
                        .about("Look a bond up by name (fetches the whole list)")
                        .arg(Arg::new("name").required(true))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("create")
                        .about("Create a bond and its issuance cost")
                        .args(bond_args(true))
                        .args(cost_args()),
                )
                .subcommand(
                    Command::new("update")
                        .about("Change fields of a saved bond")
                        .arg(id_arg("id"))
                        .args(bond_args(false)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a bond and its issuance cost")
                        .arg(id_arg("id")),
                ),
        )
        .subcommand(
            Command::new("costs")
                .about("Issuance costs of a bond")
                .subcommand(
                    Command::new("show")
                        .arg(id_arg("bond-id"))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("update")
                        .arg(id_arg("bond-id"))
                        .args(cost_args()),
                )
                .subcommand(
                    Command::new("initial")
                        .about("Compute initial costs on the service")
                        .arg(id_arg("bond-id")),
                )
                .subcommand(
                    Command::new("final")
                        .about("Compute final costs on the service")
                        .arg(id_arg("bond-id")),
                ),
        )
        .subcommand(
            Command::new("analysis")
                .about("Financial indicators (TCEA, TREA, duration, convexity...)")
                .arg(
                    Arg::new("id")
                        .value_parser(value_parser!(i64))
                        .required_unless_present("all"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("id"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("schedule")
                .about("Payment schedule, optionally with a grace period applied")
                .arg(id_arg("id"))
                .arg(
                    Arg::new("grace-type")
                        .long("grace-type")
                        .value_parser(value_parser!(GracePeriodType)),
                )
                .arg(
                    Arg::new("grace-periods")
                        .long("grace-periods")
                        .value_parser(value_parser!(u32))
                        .requires("grace-type"),
                )
                .arg(Arg::new("csv").long("csv").help("Also write the rows to this CSV file"))
                .args(output_args()),
        )
}

fn id_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(value_parser!(i64))
}

fn json_flag() -> Arg {
    Arg::new("json").long("json").action(ArgAction::SetTrue)
}

fn output_args() -> Vec<Arg> {
    vec![
        json_flag(),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json"),
    ]
}

fn bond_args(required: bool) -> Vec<Arg> {
    vec![
        Arg::new("name").long("name").required(required),
        Arg::new("nominal").long("nominal").required(required),
        Arg::new("commercial").long("commercial").required(required),
        Arg::new("years")
            .long("years")
            .value_parser(value_parser!(u32))
            .required(required),
        Arg::new("frequency")
            .long("frequency")
            .value_parser(value_parser!(CouponFrequency))
            .required(required),
        Arg::new("days")
            .long("days")
            .value_parser(value_parser!(DayCountBasis))
            .required(required),
        Arg::new("rate-type")
            .long("rate-type")
            .value_parser(value_parser!(InterestRateType))
            .required(required),
        Arg::new("capitalization")
            .long("capitalization")
            .help("Days, or monthly/quarterly/semiannual/annual")
            .required(required),
        Arg::new("rate").long("rate").required(required),
        Arg::new("discount").long("discount").required(required),
        Arg::new("issue-date")
            .long("issue-date")
            .help("YYYY-MM-DD or DD/MM/YYYY")
            .required(required),
        Arg::new("currency").long("currency").required(required),
    ]
}

fn cost_args() -> Vec<Arg> {
    let mut args = vec![Arg::new("premium").long("premium").help("Premium, percent")];
    for (pct, payer) in [
        ("structuring", "structuring-payer"),
        ("placement", "placement-payer"),
        ("flotation", "flotation-payer"),
        ("cavali", "cavali-payer"),
    ] {
        args.push(Arg::new(pct).long(pct).help("Cost, percent"));
        args.push(
            Arg::new(payer)
                .long(payer)
                .value_parser(value_parser!(Payer))
                .help("issuer, investor or shared"),
        );
    }
    args
}
