//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use subsynth::{ParamDescriptor, SynthConfig, SynthParam};

#[derive(Args)]
pub struct ParamsArgs {
    /// Print a config file with every parameter at its default
    #[arg(long)]
    toml: bool,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    if args.toml {
        let config = SynthParam::ALL
            .iter()
            .fold(SynthConfig::default(), |config, &param| {
                config.with_param(param, param.default_value())
            });
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    println!("Parameters");
    println!("==========");
    println!();
    println!(
        "  {:18}  {:20}  {:10}  {:12}  {}",
        "ID", "Name", "Group", "Default", "Range"
    );
    println!(
        "  {:18}  {:20}  {:10}  {:12}  {}",
        "--", "----", "-----", "-------", "-----"
    );

    for param in SynthParam::ALL {
        let desc = param.descriptor();
        println!(
            "  {:18}  {:20}  {:10}  {:12}  {}",
            desc.string_id,
            desc.name,
            desc.group,
            format_value(&desc, desc.default),
            format_range(&desc)
        );
    }

    println!();
    println!("Set values with --param id=value, e.g.:");
    println!("  subsynth render out.wav --notes 48,55 --param osc1_type=square --param filter_cutoff=1800");

    Ok(())
}

fn format_value(desc: &ParamDescriptor, value: f32) -> String {
    match desc.label(value) {
        Some(label) => label.to_string(),
        None => format!("{}{}", value, desc.unit.suffix()),
    }
}

fn format_range(desc: &ParamDescriptor) -> String {
    if desc.labels.is_empty() {
        format!("{}..{}{}", desc.min, desc.max, desc.unit.suffix())
    } else {
        desc.labels.join(" | ")
    }
}
