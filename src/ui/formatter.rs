//! Pure formatting functions for UI output.
//!
//! Everything a run prints goes to stderr so stdout stays free for the JSON
//! build options.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::ReleaseOutcome;
use crate::domain::RunContext;

/// Placeholder for values that were not provided
pub const NONE: &str = "(none)";

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// `value`, or the placeholder when it is blank
pub fn format_or_none(value: &str) -> &str {
    if value.trim().is_empty() {
        NONE
    } else {
        value
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// One-line description of what kind of run this is.
///
/// ```ignore
/// describe_context(&ctx) // "merge request !12 (feature/login -> main)"
/// ```
pub fn describe_context(ctx: &RunContext) -> String {
    if let Some(tag) = ctx.tag() {
        return format!("tag build {}", tag);
    }
    if ctx.is_merge_request() {
        let id = ctx
            .merge_request_id()
            .map(|id| format!(" !{}", id))
            .unwrap_or_default();
        let target = ctx.merge_request_target_branch().unwrap_or(NONE);
        return format!(
            "merge request{} ({} -> {})",
            id,
            format_or_none(ctx.effective_ref()),
            target
        );
    }
    if ctx.is_default_branch() {
        return format!("default branch {}", ctx.default_branch());
    }
    if ctx.is_feature_branch() {
        return format!("feature branch {}", ctx.effective_ref());
    }
    format!("branch {}", format_or_none(ctx.effective_ref()))
}

/// A titled block of `label: value` rows
pub type Section = (&'static str, Vec<(&'static str, String)>);

/// Summary rows grouped by section, in print order.
///
/// The merge-request section only appears on merge-request runs.
pub fn summary_sections(outcome: &ReleaseOutcome) -> Vec<Section> {
    let ctx = &outcome.context;
    let text = |value: &str| format_or_none(value).to_string();

    let mut sections: Vec<Section> = vec![
        (
            "Pipeline",
            vec![
                ("Source", ctx.source().to_string()),
                ("Pipeline", text(ctx.pipeline_id())),
                ("URL", text(ctx.pipeline_url())),
                ("Job", text(ctx.job_id())),
            ],
        ),
        (
            "Ref/Commit",
            vec![
                ("Ref", text(ctx.ref_name())),
                ("Effective ref", text(ctx.effective_ref())),
                ("Tag", text(ctx.tag().unwrap_or_default())),
                ("SHA", text(ctx.sha())),
                ("Short SHA", text(ctx.short_sha())),
            ],
        ),
    ];

    if ctx.is_merge_request() {
        sections.push((
            "Merge Request",
            vec![
                ("ID", text(ctx.merge_request_id().unwrap_or_default())),
                (
                    "Target",
                    text(ctx.merge_request_target_branch().unwrap_or_default()),
                ),
            ],
        ));
    }

    sections.push((
        "Project",
        vec![
            ("Path", text(ctx.project_path())),
            ("ID", text(ctx.project_id())),
            ("URL", text(ctx.project_url())),
            ("Registry", text(ctx.registry_base())),
            ("Application", text(ctx.application_name())),
        ],
    ));
    sections.push((
        "Derived",
        vec![
            ("Run", describe_context(ctx)),
            ("Default branch", text(ctx.default_branch())),
            ("Feature prefix", text(ctx.feature_prefix())),
            ("Tag build", yes_no(ctx.is_tag()).to_string()),
            ("Merge request", yes_no(ctx.is_merge_request()).to_string()),
            ("On default branch", yes_no(ctx.is_default_branch()).to_string()),
            ("Feature branch", yes_no(ctx.is_feature_branch()).to_string()),
        ],
    ));

    let forecast = &outcome.forecast;
    sections.push((
        "Version",
        vec![
            ("Latest tag", text(&forecast.latest_tag)),
            (
                "Bump",
                format!("{} ({})", outcome.bump.kind, outcome.bump.source),
            ),
            ("Next", text(forecast.next_version.as_deref().unwrap_or_default())),
            (
                "Next RC",
                text(forecast.next_rc_version.as_deref().unwrap_or_default()),
            ),
        ],
    ));

    let mut plan_rows = vec![
        ("Flow", format!("{} ({})", outcome.flow, outcome.flow_rule)),
        ("Publish", yes_no(outcome.plan.publish).to_string()),
    ];
    plan_rows.extend(outcome.plan.refs.iter().map(|r| ("Ref", r.clone())));
    sections.push(("Plan", plan_rows));

    sections
}

/// Print the run summary section by section.
pub fn display_summary(outcome: &ReleaseOutcome) {
    for (title, rows) in summary_sections(outcome) {
        eprintln!("\n{}", style(title).bold());
        for (label, value) in rows {
            eprintln!("  {:<18} {}", format!("{}:", label), value);
        }
    }
    if outcome.build_options.dry_run {
        eprintln!("\n{} dry run, nothing will be pushed", style("→").yellow());
    }
}
