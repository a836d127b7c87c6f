use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use super::labels::{self, Lang};
use crate::rank::RankedMunicipality;
use crate::scoring::{ModuleKind, ModuleResult, ScoreMode, Scored, WeightTemplate};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a 0..100 score with one decimal.
/// If incomplete is true, appends asterisk to indicate that some module had no signal
pub fn format_score(score: f64, incomplete: bool) -> String {
    let formatted = format!("{:.1}", score);
    if incomplete {
        format!("{}*", formatted)
    } else {
        formatted
    }
}

/// Scored with less than full confidence: a module was left out or had no signal.
fn is_incomplete(ranked: &RankedMunicipality) -> bool {
    ranked.aggregate.overall_max_possible < 100.0 - 1e-9
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn module_cell(ranked: &RankedMunicipality, kind: ModuleKind) -> String {
    match ranked.modules.get(&kind) {
        Some(result) => {
            let summary = result.summary();
            let no_signal = summary.effective_confidence() == 0;
            format_score(summary.effective_score, no_signal)
        }
        None => "-".to_string(),
    }
}

/// Format ranked municipalities as a table with columns:
/// Index, Overall, one column per scored module, Name
/// Index column: 3 chars (fits "99."), right-aligned
/// Overall column is right-aligned, 7 chars wide (fits "100.0*")
pub fn format_ranked_table(
    ranked: &[RankedMunicipality],
    modules: &[ModuleKind],
    lang: Lang,
    use_colors: bool,
) -> String {
    if ranked.is_empty() {
        return match lang {
            Lang::En => "No municipalities found.".to_string(),
            Lang::Nb => "Fant ingen kommuner.".to_string(),
        };
    }

    let term_width = get_terminal_width();

    let index_width = 3;
    let score_width = 7;
    let separator = "  ";
    let module_widths: Vec<usize> = modules
        .iter()
        .map(|k| labels::module(lang, *k).chars().count().max(score_width))
        .collect();
    let fixed_width = index_width
        + 1
        + score_width
        + module_widths
            .iter()
            .map(|w| w + separator.len())
            .sum::<usize>()
        + separator.len();

    let mut header = format!(
        "{:>index_width$} {:>score_width$}",
        "#",
        labels::overall(lang),
        index_width = index_width,
        score_width = score_width
    );
    for (kind, width) in modules.iter().zip(&module_widths) {
        header.push_str(separator);
        header.push_str(&format!("{:>width$}", labels::module(lang, *kind), width = width));
    }
    header.push_str(separator);
    header.push_str(labels::municipality(lang));

    let mut lines = Vec::with_capacity(ranked.len() + 1);
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for (idx, r) in ranked.iter().enumerate() {
        // 1-based index, right-aligned with trailing dot
        let index_str = format!("{:>2}.", idx + 1);
        let overall = format!(
            "{:>width$}",
            format_score(r.overall(), is_incomplete(r)),
            width = score_width
        );

        let mut cells = String::new();
        for (kind, width) in modules.iter().zip(&module_widths) {
            cells.push_str(separator);
            cells.push_str(&format!("{:>width$}", module_cell(r, *kind), width = width));
        }

        let name = if let Some(width) = term_width {
            if width > fixed_width + 10 {
                truncate_name(&r.name, width - fixed_width)
            } else {
                // Very narrow terminal, show truncated
                truncate_name(&r.name, 20)
            }
        } else {
            // No terminal (pipe), don't truncate
            r.name.clone()
        };

        let line = if use_colors {
            format!(
                "{} {}{}{}{}",
                index_str.dimmed(),
                overall.bold(),
                cells,
                separator,
                name.cyan()
            )
        } else {
            format!("{} {}{}{}{}", index_str, overall, cells, separator, name)
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Format ranked municipalities as tab-separated values for scripting
/// Columns: id, name, overall, then one column per module (no headers, no colors)
/// Modules that were not scored are left empty.
pub fn format_tsv(ranked: &[RankedMunicipality], modules: &[ModuleKind]) -> String {
    if ranked.is_empty() {
        return String::new();
    }

    ranked
        .iter()
        .map(|r| {
            let mut fields = vec![r.id.clone(), r.name.clone(), format!("{:.2}", r.overall())];
            for kind in modules {
                fields.push(
                    r.module_score(*kind)
                        .map(|s| format!("{:.2}", s))
                        .unwrap_or_default(),
                );
            }
            fields.join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked municipalities as pretty JSON, full traces included.
pub fn format_json(ranked: &[RankedMunicipality]) -> Result<String> {
    serde_json::to_string_pretty(ranked).context("Failed to serialize ranking as JSON")
}

/// Person lines of one module: label, score if counted, explanation.
fn person_lines(result: &ModuleResult, lang: Lang) -> Vec<(String, Option<f64>, &str)> {
    match result {
        ModuleResult::Capacity(_) => Vec::new(),
        ModuleResult::WorkOpportunity(r) => r
            .persons
            .iter()
            .map(|p| {
                (
                    format!("{} ({})", p.person_id, labels::person_type(lang, p.person_type)),
                    p.eligible.then_some(p.composite),
                    p.explanation.as_str(),
                )
            })
            .collect(),
        ModuleResult::Connection(r) => r
            .persons
            .iter()
            .map(|p| {
                let label = match p.relation {
                    Some(rel) => format!("{} ({})", p.person_id, labels::relation(lang, rel)),
                    None => format!(
                        "{} ({})",
                        p.person_id,
                        labels::person_type(lang, p.person_type)
                    ),
                };
                (label, p.counted.then_some(p.base_score), p.explanation.as_str())
            })
            .collect(),
        ModuleResult::Healthcare(r) => r
            .persons
            .iter()
            .map(|p| {
                let label = match p.specialist_need {
                    Some(t) => format!(
                        "{} ({})",
                        p.person_id,
                        labels::specialist_treatment(lang, t)
                    ),
                    None => p.person_id.clone(),
                };
                (label, Some(p.composite), p.explanation.as_str())
            })
            .collect(),
        ModuleResult::Education(r) => r
            .persons
            .iter()
            .map(|p| {
                (
                    format!(
                        "{} ({})",
                        p.person_id,
                        labels::education_facility(lang, p.education_need)
                    ),
                    p.counted.then_some(p.score),
                    p.explanation.as_str(),
                )
            })
            .collect(),
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|l| format!("{}{}", prefix, l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one scored municipality with per-module explanations and person traces
pub fn format_municipality_detail(r: &RankedMunicipality, lang: Lang, use_colors: bool) -> String {
    let mut out = Vec::new();

    let title = match r.region {
        Some(ref region) => format!("{} ({}, {})", r.name, r.id, region),
        None => format!("{} ({})", r.name, r.id),
    };
    out.push(if use_colors {
        title.bold().to_string()
    } else {
        title
    });
    out.push(format!(
        "  {}: {} of max {}",
        labels::overall(lang),
        format_score(r.overall(), false),
        format_score(r.aggregate.overall_max_possible, false)
    ));

    for (kind, result) in &r.modules {
        let summary = result.summary();
        let share = r
            .aggregate
            .contributions
            .get(kind)
            .map(|c| (c.normalized_weight, c.contribution))
            .unwrap_or((0.0, 0.0));
        out.push(String::new());

        let heading = format!(
            "{}: {} (weight {:.0}%, contributes {:.1}, {})",
            labels::module(lang, *kind),
            format_score(summary.effective_score, summary.effective_confidence() == 0),
            share.0 * 100.0,
            share.1,
            summary.mode.as_str()
        );
        out.push(if !use_colors {
            heading
        } else if summary.mode == ScoreMode::Feasible {
            heading.green().to_string()
        } else {
            heading.yellow().to_string()
        });
        out.push(indent(&summary.explanation, "  "));

        if let ModuleResult::Capacity(c) = result {
            for row in &c.subscores {
                out.push(format!("  {}", row.formula));
            }
        }

        for (label, score, explanation) in person_lines(result, lang) {
            let score = score.map_or_else(|| "-".to_string(), |s| format_score(s, false));
            out.push(format!("  {}: {}", label, score));
            out.push(indent(explanation, "    "));
        }
    }

    for kind in &r.missing_modules {
        let weight = r
            .aggregate
            .contributions
            .get(kind)
            .map_or(0.0, |c| c.normalized_weight);
        out.push(String::new());
        let heading = format!(
            "{}: - (weight {:.0}%, {})",
            labels::module(lang, *kind),
            weight * 100.0,
            ScoreMode::MissingData.as_str()
        );
        out.push(if use_colors {
            heading.yellow().to_string()
        } else {
            heading
        });
    }

    if !r.issues.is_empty() {
        out.push(String::new());
        let heading = match lang {
            Lang::En => "Issues:",
            Lang::Nb => "Avvik:",
        };
        out.push(heading.to_string());
        for issue in &r.issues {
            out.push(format!("  - {}", issue));
        }
    }

    out.join("\n")
}

/// Format the built-in weight templates
pub fn format_templates(templates: &[WeightTemplate], lang: Lang, use_colors: bool) -> String {
    templates
        .iter()
        .map(|t| {
            let name = match lang {
                Lang::En => t.name,
                Lang::Nb => t.name_nb,
            };
            let weights = t
                .modules
                .iter()
                .map(|(kind, w)| format!("{} {}", labels::module(lang, *kind), w))
                .collect::<Vec<_>>()
                .join(", ");
            if use_colors {
                format!(
                    "{}  {}\n  {}\n  {}",
                    t.id.bold(),
                    name,
                    t.description.dimmed(),
                    weights
                )
            } else {
                format!("{}  {}\n  {}\n  {}", t.id, name, t.description, weights)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
