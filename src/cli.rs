// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn rate_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("type")
            .long("type")
            .help("Catalog rate type to use (official, blue, ...)"),
    )
    .arg(
        Arg::new("custom")
            .long("custom")
            .conflicts_with("type")
            .help("Custom rate as USD per unit (e.g. 0.0007 for ARS)"),
    )
    .arg(
        Arg::new("declared")
            .long("declared")
            .requires("custom")
            .help("Catalog type the custom rate mirrors; enables the inversion check"),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .help("Use rates effective on or before YYYY-MM-DD"),
    )
}

pub fn build_cli() -> Command {
    Command::new("fxpivot")
        .version(crate_version!())
        .about("USD-pivoted currency conversion and exchange-rate resolution")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("rates")
                .about("Exchange-rate catalog")
                .subcommand(
                    Command::new("add")
                        .about("Store a rate (fiat: units per USD, crypto: USD per unit)")
                        .arg(Arg::new("currency").required(true))
                        .arg(Arg::new("type").required(true))
                        .arg(Arg::new("rate").required(true))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List stored rates")
                        .arg(Arg::new("currency")),
                ))
                .subcommand(json_flags(
                    Command::new("resolve")
                        .about("Show the rate picker and default for a currency")
                        .arg(Arg::new("currency").required(true))
                        .arg(
                            Arg::new("prefer-favorites")
                                .long("prefer-favorites")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(Arg::new("date").long("date")),
                )),
        )
        .subcommand(
            Command::new("fx")
                .about("Convert amounts")
                .subcommand(rate_args(
                    Command::new("to-usd")
                        .arg(Arg::new("amount").required(true).allow_hyphen_values(true))
                        .arg(Arg::new("currency").required(true)),
                ))
                .subcommand(rate_args(
                    Command::new("from-usd")
                        .arg(Arg::new("amount").required(true).allow_hyphen_values(true))
                        .arg(Arg::new("currency").required(true)),
                ))
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").required(true).allow_hyphen_values(true))
                        .arg(Arg::new("from").required(true))
                        .arg(Arg::new("to").required(true))
                        .arg(Arg::new("from-type").long("from-type"))
                        .arg(Arg::new("to-type").long("to-type"))
                        .arg(Arg::new("date").long("date")),
                )
                .subcommand(
                    Command::new("display-rate")
                        .arg(Arg::new("currency").required(true))
                        .arg(Arg::new("type").long("type"))
                        .arg(
                            Arg::new("mode")
                                .long("mode")
                                .default_value("usd-to-foreign")
                                .value_parser(["usd-to-foreign", "foreign-to-usd"]),
                        ),
                ),
        )
        .subcommand(
            Command::new("fav")
                .about("Favorite rate types")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("toggle")
                        .arg(Arg::new("currency").required(true))
                        .arg(Arg::new("type").required(true)),
                )
                .subcommand(
                    Command::new("move")
                        .about("Move the favorite at position FROM to position TO (1-based)")
                        .arg(Arg::new("from").required(true).value_parser(value_parser!(usize)))
                        .arg(Arg::new("to").required(true).value_parser(value_parser!(usize))),
                )
                .subcommand(
                    Command::new("reorder")
                        .about("Set the full order by favorite id")
                        .arg(
                            Arg::new("ids")
                                .required(true)
                                .num_args(1..)
                                .value_parser(value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("record")
                .about("Expenses, budget lines, assets and recurring templates")
                .subcommand(rate_args(
                    Command::new("add")
                        .arg(
                            Arg::new("kind")
                                .required(true)
                                .value_parser(["expense", "budget", "asset", "recurring"]),
                        )
                        .arg(Arg::new("amount").required(true).allow_hyphen_values(true))
                        .arg(Arg::new("currency").required(true))
                        .arg(Arg::new("note").long("note")),
                ))
                .subcommand(rate_args(
                    Command::new("edit")
                        .about("Change amount, currency or rate; recomputes the USD snapshot")
                        .arg(Arg::new("id").required(true).value_parser(value_parser!(i64)))
                        .arg(Arg::new("amount").long("amount").allow_hyphen_values(true))
                        .arg(Arg::new("currency").long("currency")),
                ))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("kind").long("kind"))
                        .arg(Arg::new("month").long("month"))
                        .arg(Arg::new("limit").long("limit").value_parser(value_parser!(usize)))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .help("Also show each record in this currency"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("total")
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("kind").long("kind"))
                        .arg(Arg::new("month").long("month"))
                        .arg(
                            Arg::new("by")
                                .long("by")
                                .value_parser(["month", "kind"]),
                        ),
                ))
                .subcommand(
                    Command::new("export")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(Command::new("get").arg(Arg::new("key")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Find unconvertible records and suspicious rates"))
}
