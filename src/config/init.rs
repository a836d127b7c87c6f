use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

/// Starter scenario written by `resettle-rank init`.
pub const STARTER_SCENARIO: &str = r#"# resettle-rank scenario
#
# One group to settle, the candidate municipalities, and the weighting.
# Run `resettle-rank` to rank the municipalities, `resettle-rank inspect <id>`
# for the per-module explanation of one of them.

group:
  persons:
    - id: mother
      person_type: adult_working
      profession: nurse
      connection: { municipality_id: "3403", relation: close_family }
      education_need: adult_language
    - id: father
      person_type: adult_not_working
      needs_hospital: true
      specialist_need: dialysis
    - id: daughter
      person_type: child
      education_need: primary_school
    - id: son
      person_type: baby

municipalities:
  - id: "3403"
    name: Hamar
    region: innlandet
    neighbors: ["3411", "3413"]
    capacity: { capacity_total: 30, settled_current: 18, tentative_claim: 2 }
    work:
      unemployment_rate: 2.1
      profession_history:
        nurse: { employees_5y_ago: 610, employees_now: 655, pct_workforce_5y_ago: 3.1, pct_workforce_now: 3.3 }
        welder: { employees_5y_ago: 80, employees_now: 74, pct_workforce_5y_ago: 0.4, pct_workforce_now: 0.4 }
    healthcare: { has_hospital: true, specialist_facilities: [dialysis, oncology] }
    education: { has_primary_school: true, has_high_school: true, has_university: true, has_adult_language: true }

  - id: "3411"
    name: Ringsaker
    region: innlandet
    neighbors: ["3403"]
    capacity: { capacity_total: 25, settled_current: 9 }
    work:
      unemployment_rate: 2.4
      profession_history:
        nurse: { employees_5y_ago: 420, employees_now: 470, pct_workforce_5y_ago: 2.2, pct_workforce_now: 2.5 }
        welder: { employees_5y_ago: 60, employees_now: 66, pct_workforce_5y_ago: 0.3, pct_workforce_now: 0.3 }
    education: { has_primary_school: true, has_high_school: true, has_adult_language: true }

  - id: "3413"
    name: Stange
    region: innlandet
    neighbors: ["3403"]
    capacity: { capacity_total: 12, settled_current: 11 }
    work:
      unemployment_rate: 1.9
    education: { has_primary_school: true, has_adult_language: true }

  - id: "4601"
    name: Bergen
    region: vestland
    capacity: { capacity_total: 120, settled_current: 64 }
    work:
      unemployment_rate: 2.8
      profession_history:
        nurse: { employees_5y_ago: 5200, employees_now: 5650, pct_workforce_5y_ago: 3.6, pct_workforce_now: 3.8 }
        welder: { employees_5y_ago: 900, employees_now: 870, pct_workforce_5y_ago: 0.6, pct_workforce_now: 0.6 }
    healthcare: { has_hospital: true, specialist_facilities: [dialysis, cardiology, oncology, mental_health] }
    education: { has_primary_school: true, has_high_school: true, has_university: true, has_adult_language: true }

weights:
  template: standard
  # modules:
  #   capacity: 25
  #   work_opportunity: 25
  #   connection: 20
  #   healthcare: 15
  #   education: 15
  capacity_options:
    include_tentative: true
    allow_overflow: false
"#;

/// Write the starter scenario to `path`, creating parent directories.
///
/// Refuses to replace an existing file unless `force` is set. The write is
/// atomic: readers see either the old file or the complete new one.
pub fn write_starter_scenario(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Scenario already exists at {}. Use --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(STARTER_SCENARIO.as_bytes())
        .context("Failed to write starter scenario")?;
    file.commit()
        .with_context(|| format!("Failed to save scenario to {}", path.display()))?;

    Ok(())
}
