//! Scenario runner: spawns `combidoe`, captures its output and checks it
//! against the scenario's expectation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, error, info};

use combidoe_common::{is_n_way_covered, ExperimentSet};

use crate::error::{E2eError, E2eResult};
use crate::scenario::{Expectation, ScenarioSpec};

/// Captured result of one process run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

/// Solution as printed in plain format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSolution {
    pub rows: Vec<Vec<u32>>,
    pub run_seed: u64,
    pub attempt: Option<u64>,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub runs: usize,
    pub solution: Option<ParsedSolution>,
    pub error: Option<String>,
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub binary_path: PathBuf,
    pub scenarios_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Per-invocation limit
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("target/debug/combidoe"),
            scenarios_dir: PathBuf::from("crates/e2e/tests/scenarios"),
            output_dir: PathBuf::from("test-results"),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Main E2E scenario runner
pub struct ScenarioRunner {
    config: RunnerConfig,
}

impl ScenarioRunner {
    pub fn new(config: RunnerConfig) -> E2eResult<Self> {
        if !config.binary_path.exists() {
            return Err(E2eError::BinaryNotFound(config.binary_path.display().to_string()));
        }
        Ok(Self { config })
    }

    /// Run all scenarios in the scenarios directory
    pub async fn run_all(&self) -> E2eResult<SuiteResult> {
        let specs = ScenarioSpec::load_all(&self.config.scenarios_dir)?;
        Ok(self.run_specs(&specs).await)
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<SuiteResult> {
        let specs = ScenarioSpec::load_all(&self.config.scenarios_dir)?;
        let filtered: Vec<ScenarioSpec> = ScenarioSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
        Ok(self.run_specs(&filtered).await)
    }

    /// Run a specific scenario by name
    pub async fn run_named(&self, name: &str) -> E2eResult<ScenarioResult> {
        let specs = ScenarioSpec::load_all(&self.config.scenarios_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))?;
        self.run_scenario(&spec).await
    }

    /// Run a list of scenarios
    pub async fn run_specs(&self, specs: &[ScenarioSpec]) -> SuiteResult {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} scenario(s)...", specs.len());

        for spec in specs {
            let result = match self.run_scenario(spec).await {
                Ok(result) => result,
                Err(e) => ScenarioResult {
                    name: spec.name.clone(),
                    success: false,
                    duration_ms: 0,
                    runs: 0,
                    solution: None,
                    error: Some(e.to_string()),
                },
            };
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!("✗ {} - {}", result.name, result.error.as_deref().unwrap_or("unknown error"));
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Scenario Results: {} passed, {} failed ({} ms)", passed, failed, duration_ms);

        SuiteResult {
            total: specs.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run a single scenario, repeating it as requested
    pub async fn run_scenario(&self, spec: &ScenarioSpec) -> E2eResult<ScenarioResult> {
        let start = Instant::now();
        debug!("Running scenario: {}", spec.name);

        let args = spec.args.to_args();
        let mut invocations = Vec::with_capacity(spec.repeat);
        for _ in 0..spec.repeat {
            invocations.push(self.invoke(&args).await?);
        }

        let verdict = check_expectation(spec, &invocations);
        let solution = invocations.first().and_then(|inv| parse_solution(&inv.stdout));

        Ok(ScenarioResult {
            name: spec.name.clone(),
            success: verdict.is_ok(),
            duration_ms: start.elapsed().as_millis() as u64,
            runs: invocations.len(),
            solution,
            error: verdict.err(),
        })
    }

    async fn invoke(&self, args: &[String]) -> E2eResult<Invocation> {
        let start = Instant::now();
        let child = Command::new(&self.config.binary_path)
            .args(args)
            .env_remove("COMBIDOE_CONFIG")
            .env("RUST_LOG", "warn")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Spawn {
                binary: self.config.binary_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let output = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| E2eError::Timeout(self.config.timeout))??;

        Ok(Invocation {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Write suite results to JSON file
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        write_results(&self.config.output_dir, results)
    }
}

/// Write suite results as `scenario-results.json` under `dir`
pub fn write_results(dir: &Path, results: &SuiteResult) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join("scenario-results.json");
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}

static ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d+(?:, \d+)*)\]$").expect("valid regex"));
static SEED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Random seed for this solution is (\d+)$").expect("valid regex"));
static ATTEMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Solved on attempt #(\d+)").expect("valid regex"));

/// Parse the plain-format solution printed on stdout.
pub fn parse_solution(stdout: &str) -> Option<ParsedSolution> {
    let mut lines = stdout.lines().map(str::trim);
    if lines.next()? != "Solution Found:" {
        return None;
    }

    let mut rows = Vec::new();
    let mut run_seed = None;
    let mut attempt_no = None;
    for line in lines {
        if let Some(caps) = ROW.captures(line) {
            let values = caps[1]
                .split(", ")
                .map(|v| v.parse().ok())
                .collect::<Option<Vec<u32>>>()?;
            rows.push(values);
        } else if let Some(caps) = SEED.captures(line) {
            run_seed = caps[1].parse().ok();
        } else if let Some(caps) = ATTEMPT.captures(line) {
            attempt_no = caps[1].parse().ok();
        }
    }

    Some(ParsedSolution {
        rows,
        run_seed: run_seed?,
        attempt: attempt_no,
    })
}

/// Compare invocations against the scenario expectation.
pub fn check_expectation(spec: &ScenarioSpec, invocations: &[Invocation]) -> Result<(), String> {
    let first = invocations
        .first()
        .ok_or_else(|| "scenario ran zero times".to_string())?;
    if let Some(i) = invocations.iter().position(|inv| inv.stdout != first.stdout) {
        return Err(format!("run {} printed different output than run 1", i + 1));
    }

    match &spec.expect {
        Expectation::Solved {
            rows,
            seed,
            max_rows,
        } => {
            expect_status(first, 0)?;
            let solution = parse_solution(&first.stdout)
                .ok_or_else(|| format!("no solution in stdout: {:?}", first.stdout))?;

            for row in &solution.rows {
                let in_range = row.len() == spec.args.specification.len()
                    && row.iter().zip(&spec.args.specification).all(|(v, d)| v < d);
                if !in_range {
                    return Err(format!("row {:?} does not fit the specification", row));
                }
            }
            let printed = ExperimentSet::from(solution.rows.clone());
            if !is_n_way_covered(spec.args.factors, &spec.args.specification, &printed) {
                return Err(format!(
                    "printed rows are not {}-way covering",
                    spec.args.factors
                ));
            }
            if let Some(expected) = rows {
                if &solution.rows != expected {
                    return Err(format!("rows {:?}, expected {:?}", solution.rows, expected));
                }
            }
            if let Some(expected) = seed {
                if solution.run_seed != *expected {
                    return Err(format!("seed {}, expected {}", solution.run_seed, expected));
                }
            }
            if let Some(max) = max_rows {
                if solution.rows.len() > *max {
                    return Err(format!("{} rows printed, at most {} expected", solution.rows.len(), max));
                }
            }
            Ok(())
        }
        Expectation::Invalid { message_contains } => {
            expect_status(first, 2)?;
            if let Some(needle) = message_contains {
                if !first.stderr.contains(needle.as_str()) {
                    return Err(format!("stderr {:?} does not mention {:?}", first.stderr, needle));
                }
            }
            Ok(())
        }
        Expectation::Exhausted => expect_status(first, 3),
    }
}

fn expect_status(invocation: &Invocation, code: i32) -> Result<(), String> {
    if invocation.status == Some(code) {
        Ok(())
    } else {
        Err(format!(
            "exit status {:?}, expected {}; stderr: {}",
            invocation.status,
            code,
            invocation.stderr.trim()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const SOLVED: &str = "Solution Found:\n[0, 0, 1]\n[1, 1, 1]\n[0, 1, 0]\n[1, 0, 0]\n\
                          Random seed for this solution is 4\n\
                          Solved on attempt #12 (attempt seed 987)\n";

    fn invocation(status: i32, stdout: &str, stderr: &str) -> Invocation {
        Invocation {
            status: Some(status),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration_ms: 1,
        }
    }

    fn scenario(expect: &str) -> ScenarioSpec {
        ScenarioSpec::from_yaml(&format!(
            "name: t\nargs: {{ specification: [2, 2, 2], factors: 2, experiments: 4, seed: 4 }}\nexpect: {}\n",
            expect
        ))
        .unwrap()
    }

    #[test]
    fn test_parse_solution() {
        let parsed = parse_solution(SOLVED).unwrap();
        assert_eq!(parsed.rows.len(), 4);
        assert_eq!(parsed.rows[1], vec![1, 1, 1]);
        assert_eq!(parsed.run_seed, 4);
        assert_eq!(parsed.attempt, Some(12));
    }

    #[test]
    fn test_parse_rejects_other_output() {
        assert!(parse_solution("").is_none());
        assert!(parse_solution("{\"rows\": []}").is_none());
        assert!(parse_solution("Solution Found:\n[0, 1]\n").is_none());
    }

    #[test_case("{ outcome: solved }", true ; "solved")]
    #[test_case("{ outcome: solved, seed: 4, max_rows: 4 }", true ; "solved with seed")]
    #[test_case("{ outcome: solved, seed: 5 }", false ; "wrong seed")]
    #[test_case("{ outcome: solved, max_rows: 3 }", false ; "too many rows")]
    #[test_case("{ outcome: solved, rows: [[0, 0, 1], [1, 1, 1], [0, 1, 0], [1, 0, 0]] }", true ; "exact rows")]
    #[test_case("{ outcome: exhausted }", false ; "wrong outcome")]
    fn test_check_solved_output(expect: &str, ok: bool) {
        let spec = scenario(expect);
        assert_eq!(check_expectation(&spec, &[invocation(0, SOLVED, "")]).is_ok(), ok);
    }

    #[test]
    fn test_check_detects_non_covering_rows() {
        let stdout = "Solution Found:\n[0, 0, 0]\n[1, 1, 1]\nRandom seed for this solution is 4\n";
        let err = check_expectation(&scenario("{ outcome: solved }"), &[invocation(0, stdout, "")])
            .unwrap_err();
        assert!(err.contains("not 2-way covering"));
    }

    #[test]
    fn test_check_detects_nondeterminism() {
        let other = SOLVED.replace("[0, 0, 1]\n[1, 1, 1]", "[1, 1, 1]\n[0, 0, 1]");
        let err = check_expectation(
            &scenario("{ outcome: solved }"),
            &[invocation(0, SOLVED, ""), invocation(0, &other, "")],
        )
        .unwrap_err();
        assert!(err.contains("run 2"));
    }

    #[test]
    fn test_check_invalid() {
        let spec = scenario("{ outcome: invalid, message_contains: \"(12)\" }");
        let stderr = "error: Invalid specification: ... (12), got 5";
        assert!(check_expectation(&spec, &[invocation(2, "", stderr)]).is_ok());
        assert!(check_expectation(&spec, &[invocation(2, "", "other")]).is_err());
        assert!(check_expectation(&spec, &[invocation(1, "", stderr)]).is_err());
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let suite = SuiteResult {
            total: 0,
            passed: 0,
            failed: 0,
            duration_ms: 0,
            results: vec![],
        };
        let path = write_results(dir.path(), &suite).unwrap();
        let back: SuiteResult =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back.total, 0);
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunnerConfig {
            binary_path: dir.path().join("combidoe"),
            ..Default::default()
        };
        assert!(matches!(
            ScenarioRunner::new(config),
            Err(E2eError::BinaryNotFound(_))
        ));
    }
}
