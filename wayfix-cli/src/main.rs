mod config;
mod review;
mod rules;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, OutputFormat};
use fs_err as fs;
use review::TerminalReviewer;
use serde::Serialize;
use std::io;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use wayfix_domain::{
    AcceptAll, CorrectionReviewer, DIRECTION_MARKERS, DIRECTIONAL_PAIRS, REVERSE_WAY_MESSAGE,
    ReviewDecision, compute_role_corrections, compute_tag_corrections, irreversible_ways,
};
use wayfix_edit::{ApplyOptions, EditError, ReversalPlan, preview_patch, reverse_ways};
use wayfix_render::{render_change_set_md, render_proposal_md, render_report_md};
use wayfix_types::correction::CorrectionProposal;
use wayfix_types::osm::DataSet;
use wayfix_types::report::{ToolInfo, WayfixReport};

#[derive(Debug, Parser)]
#[command(
    name = "wayfix",
    version,
    about = "Reverse OpenStreetMap ways and keep their directional tags and roles consistent."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List ways whose tags depend on their direction.
    Check(CheckArgs),
    /// Plan the reversal of ways, accepting every correction, and write artifacts.
    Plan(PlanArgs),
    /// Reverse ways, reviewing the proposed corrections (default: dry-run).
    Reverse(ReverseArgs),
    /// List the correction rules.
    ListRules(ListRulesArgs),
    /// Explain one correction rule.
    Explain(ExplainArgs),
}

#[derive(Debug, Parser)]
struct InputArgs {
    /// Data set (JSON with `nodes`, `ways`, `relations` arrays).
    #[arg(long)]
    data: Utf8PathBuf,

    /// Config file (default: wayfix.toml next to the data file).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct CheckArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output format (text, json).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Way to reverse; repeat for several ways.
    #[arg(long = "way", required = true, allow_negative_numbers = true)]
    ways: Vec<i64>,

    /// Output directory for artifacts (default: <data dir>/wayfix).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ReverseArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Way to reverse; repeat for several ways.
    #[arg(long = "way", required = true, allow_negative_numbers = true)]
    ways: Vec<i64>,

    /// Accept every proposed correction without prompting.
    #[arg(long, short = 'y', default_value_t = false)]
    yes: bool,

    /// Overwrite the data file with the result.
    #[arg(long, default_value_t = false)]
    write: bool,

    /// Write the result to this file instead of the data file.
    #[arg(long)]
    out: Option<Utf8PathBuf>,

    /// Do not keep a backup of the data file when overwriting it.
    #[arg(long, default_value_t = false)]
    no_backup: bool,

    /// Write a JSON run report to this file.
    #[arg(long)]
    report: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ListRulesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule key (e.g., "oneway", "pairs").
    rule: String,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            let code = e
                .downcast_ref::<EditError>()
                .map(EditError::exit_code)
                .unwrap_or(1);
            error!("{:?}", e);
            ExitCode::from(code)
        }
    }
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Reverse(args) => cmd_reverse(args),
        Command::ListRules(args) => cmd_list_rules(args),
        Command::Explain(args) => cmd_explain(args),
    }
}

#[derive(Debug, Serialize)]
struct CheckFinding {
    way: i64,
    tag_corrections: usize,
    role_corrections: usize,
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let data = load_data(&args.input.data)?;
    let file_config = config::load_or_default(args.input.config.as_deref(), &args.input.data)
        .context("load wayfix.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_output_args(args.format, None);

    let findings: Vec<CheckFinding> = irreversible_ways(data.ways.values())
        .into_iter()
        .map(|way| CheckFinding {
            way: way.id,
            tag_corrections: compute_tag_corrections(way).len(),
            role_corrections: compute_role_corrections(way, &data).len(),
        })
        .collect();
    debug!(
        "{} of {} way(s) are direction-sensitive",
        findings.len(),
        data.ways.len()
    );

    match merged.format {
        OutputFormat::Text => {
            if findings.is_empty() {
                println!("All {} way(s) can be reversed as-is.", data.ways.len());
            }
            for f in &findings {
                println!(
                    "way {}: {} tag correction(s), {} role correction(s)",
                    f.way, f.tag_corrections, f.role_corrections
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&findings)?);
        }
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let started = Utc::now();
    let mut data = load_data(&args.input.data)?;
    let file_config = config::load_or_default(args.input.config.as_deref(), &args.input.data)
        .context("load wayfix.toml config")?;

    let data_dir = config::data_dir(&args.input.data);
    let out_dir = match args.out_dir {
        Some(dir) => dir,
        None => {
            let merged = ConfigMerger::new(file_config).merge_output_args(None, None);
            data_dir.join(merged.out_dir.unwrap_or_else(|| Utf8PathBuf::from("wayfix")))
        }
    };
    fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir))?;

    let mut reviewer = CollectProposals::default();
    let outcome = reverse_ways(
        &mut data,
        &args.ways,
        &mut reviewer,
        &ApplyOptions { dry_run: true },
    )
    .context("plan reversal")?;
    let patch = preview_patch(&data, &outcome.change_set).context("preview patch")?;

    write_json(&out_dir.join("changeset.json"), &outcome.change_set)?;
    fs::write(
        out_dir.join("plan.md"),
        render_change_set_md(&outcome.change_set),
    )?;
    fs::write(out_dir.join("patch.diff"), &patch)?;
    fs::write(out_dir.join("proposal.md"), reviewer.render_md())?;

    let report = report_from_plans(&outcome.plans, &outcome.change_set.id, started);
    write_json(&out_dir.join("report.json"), &report)?;

    info!("wrote plan to {}", out_dir);
    Ok(())
}

/// Accepts every correction and keeps the proposals for `proposal.md`.
#[derive(Debug, Default)]
struct CollectProposals {
    proposals: Vec<CorrectionProposal>,
}

impl CorrectionReviewer for CollectProposals {
    fn review(&mut self, proposal: &CorrectionProposal) -> anyhow::Result<ReviewDecision> {
        self.proposals.push(proposal.clone());
        AcceptAll.review(proposal)
    }
}

impl CollectProposals {
    fn render_md(&self) -> String {
        if self.proposals.is_empty() {
            return render_proposal_md(&CorrectionProposal {
                message: REVERSE_WAY_MESSAGE.to_string(),
                ..Default::default()
            });
        }
        self.proposals
            .iter()
            .map(render_proposal_md)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn cmd_reverse(args: ReverseArgs) -> anyhow::Result<()> {
    let started = Utc::now();
    let mut data = load_data(&args.input.data)?;
    let file_config = config::load_or_default(args.input.config.as_deref(), &args.input.data)
        .context("load wayfix.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_reverse_args(args.yes, args.no_backup);

    debug!(
        "merged config: auto_accept={}, backup={}, backup_suffix={}",
        merged.auto_accept, merged.backup, merged.backup_suffix
    );

    let target = match (&args.out, args.write) {
        (Some(out), _) => Some(out.clone()),
        (None, true) => Some(args.input.data.clone()),
        (None, false) => None,
    };

    let original = data.clone();
    let opts = ApplyOptions::default();
    let result = if merged.auto_accept {
        reverse_ways(&mut data, &args.ways, &mut AcceptAll, &opts)
    } else {
        let mut reviewer = TerminalReviewer::new(io::stdin().lock(), io::stdout());
        reverse_ways(&mut data, &args.ways, &mut reviewer, &opts)
    };
    let outcome = result.context("reverse ways")?;

    print!(
        "{}",
        preview_patch(&original, &outcome.change_set).context("preview patch")?
    );
    for plan in &outcome.plans {
        let o = plan.outcome();
        println!(
            "way {}: {:?} ({} tag, {} role)",
            o.way, o.status, o.tag_corrections, o.role_corrections
        );
    }

    match target {
        Some(path) => {
            if merged.backup && path == args.input.data {
                let backup = Utf8PathBuf::from(format!("{}{}", path, merged.backup_suffix));
                fs::copy(&path, &backup).with_context(|| format!("back up {}", path))?;
                debug!("backed up {} to {}", path, backup);
            }
            write_json(&path, &data)?;
            info!("wrote {}", path);
        }
        None => println!("dry-run: nothing written (use --write or --out)"),
    }

    if let Some(path) = &args.report {
        let report = report_from_plans(&outcome.plans, &outcome.change_set.id, started);
        write_json(path, &report)?;
        debug!("report:\n{}", render_report_md(&report));
    }

    Ok(())
}

fn cmd_list_rules(args: ListRulesArgs) -> anyhow::Result<()> {
    use rules::RULE_REGISTRY;

    let pairs: Vec<String> = DIRECTIONAL_PAIRS.iter().map(|p| p.name()).collect();

    match args.format {
        OutputFormat::Text => {
            println!("Correction rules:\n");
            println!("  {:<12} TITLE", "KEY");
            println!("  {:<12} -----", "---");
            for rule in RULE_REGISTRY {
                println!("  {:<12} {}", rule.key, rule.title);
            }
            println!();
            println!("Directional pairs: {}", pairs.join(", "));
            println!("Direction markers: {}", DIRECTION_MARKERS.join(", "));
            println!();
            println!("Use 'wayfix explain <key>' for details.");
        }
        OutputFormat::Json => {
            let rules: Vec<_> = RULE_REGISTRY
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "key": r.key,
                        "title": r.title,
                        "examples": r.examples,
                    })
                })
                .collect();
            let doc = serde_json::json!({
                "rules": rules,
                "pairs": pairs,
                "markers": DIRECTION_MARKERS,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use rules::{list_rule_keys, lookup_rule};

    let Some(rule) = lookup_rule(&args.rule) else {
        anyhow::bail!(
            "Unknown rule: '{}'\n\nAvailable rules: {}",
            args.rule,
            list_rule_keys().join(", ")
        );
    };

    println!("RULE: {} ({})", rule.title, rule.key);
    println!();
    println!("{}", rule.description);
    println!();
    println!("EXAMPLES");
    for (before, after) in rule.examples {
        println!("  {:<32} -> {}", before, after);
    }
    Ok(())
}

fn load_data(path: &Utf8Path) -> anyhow::Result<DataSet> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("parse data set {}", path))
}

fn write_json<T: Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "wayfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

fn report_from_plans(
    plans: &[ReversalPlan],
    changeset_id: &str,
    started: DateTime<Utc>,
) -> WayfixReport {
    let mut report = WayfixReport::new(tool_info(), started);
    report.ways = plans.iter().map(ReversalPlan::outcome).collect();
    if !changeset_id.is_empty() {
        report.changeset_id = Some(changeset_id.to_string());
    }
    report.finish(Utc::now());
    report
}
