//! vanityimport: Utilities for Go vanity imports.
//!
//! Generates the redirect pages a custom import domain serves to the Go
//! toolchain, and migrates a codebase's import paths from the repository
//! location to the vanity location.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use std::path::Path;

use cli::{Args, BuildArgs, Commands, GenerateArgs, RewriteArgs};
use vanityimport::manifest::{self, Manifest};
use vanityimport::page;
use vanityimport::rewriter::{self, FileRewrite, RewriteOptions, Reviewer};
use vanityimport::RewriteRule;

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Generate(args) => cmd_generate(args),
        Commands::Rewrite(args) => cmd_rewrite(args),
        Commands::Build(args) => cmd_build(args),
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let path = page::generate_for_repository(&args.domain, &args.repo, &args.out)?;
    print_generated(&path);
    Ok(())
}

fn cmd_rewrite(args: RewriteArgs) -> Result<()> {
    let rule = RewriteRule::new(&args.old, &args.new)?;
    if rule.is_reentrant() && !args.json {
        eprintln!(
            "{} {} lies under {}; running again will rewrite it further",
            "warn:".yellow().bold(),
            rule.new_prefix(),
            rule.old_prefix()
        );
    }

    let options = RewriteOptions {
        exclude: args.exclude,
        dry_run: args.dry_run,
    };
    let mut console = Console {
        dry_run: args.dry_run,
        interactive: args.interactive,
        quiet: args.json,
    };

    let report = rewriter::rewrite_tree(&args.dir, &rule, &options, &mut console)
        .with_context(|| format!("Failed to rewrite imports under {}", args.dir.display()))?;

    if args.verbose {
        eprintln!(
            "{} Scanned {} .go files",
            "info:".blue().bold(),
            report.files_scanned
        );
        eprintln!(
            "{} Rewrote {} imports in {} files",
            "info:".blue().bold(),
            report.imports_rewritten,
            report.modified.len()
        );
        if !report.declined.is_empty() {
            eprintln!(
                "{} Skipped {} files",
                "info:".blue().bold(),
                report.declined.len()
            );
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.modified.is_empty() && report.declined.is_empty() {
        println!("{} No imports matched {}", "info:".blue().bold(), rule.old_prefix());
    } else if args.dry_run {
        println!("\n{} Run without --dry-run to apply changes", "hint:".cyan().bold());
    }

    Ok(())
}

fn cmd_build(args: BuildArgs) -> Result<()> {
    let manifest = Manifest::load(&args.config)?;
    manifest::build_manifest(&manifest, &args.out, args.domain.as_deref(), print_generated)
        .with_context(|| format!("Failed to build pages from {}", args.config.display()))?;
    Ok(())
}

fn print_generated(path: &Path) {
    println!("{} {}", "Generated".green(), path.display());
}

/// Terminal reviewer: prints pending changes and, when interactive, asks
/// before each file is written.
struct Console {
    dry_run: bool,
    interactive: bool,
    quiet: bool,
}

impl Reviewer for Console {
    type Error = anyhow::Error;

    fn review(&mut self, rewrite: &FileRewrite) -> Result<bool> {
        if self.quiet || !(self.dry_run || self.interactive) {
            return Ok(true);
        }

        println!(
            "\n{} {}",
            if self.dry_run { "Would update:" } else { "Update:" }
                .yellow()
                .bold(),
            rewrite.path.display()
        );
        for change in &rewrite.changes {
            println!(
                "  {}:{}: {} -> {}",
                change.line,
                change.column,
                change.old.red(),
                change.new.green()
            );
        }

        if !self.interactive {
            return Ok(true);
        }

        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Apply changes to {}?", rewrite.path.display()))
            .default(true)
            .interact()
            .context("Failed to read confirmation")
    }

    fn applied(&mut self, rewrite: &FileRewrite) {
        if !self.dry_run && !self.quiet {
            println!(
                "{} {}",
                "Rewrote imports in".green(),
                rewrite.path.display()
            );
        }
    }
}
