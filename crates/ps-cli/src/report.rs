//! Report artifacts: LaTeX table, console summary, JSON result and manifest.

use anyhow::{Context, Result};
use ps_inference::DidResult;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// LaTeX table of the estimate on the log and level scales.
pub fn latex_table(res: &DidResult) -> String {
    format!(
        concat!(
            "\\begin{{table}}[h]\n",
            "\\centering\n",
            "\\caption{{Difference-in-Differences Estimate of the Effect of Paid Search on ",
            "Revenue}}\n",
            "\\begin{{tabular}}{{lcc}}\n",
            "\\hline\n",
            "& Log Scale & Levels (exp) \\\\\n",
            "\\hline\n",
            "Point Estimate ($\\hat{{\\gamma}}$) & ${:.4}$ & ${:.4}$ \\\\\n",
            "Standard Error & ${:.4}$ & --- \\\\\n",
            "95\\% CI & $[{:.4}, \\; {:.4}]$ & $[{:.4}, \\; {:.4}]$ \\\\\n",
            "\\hline\n",
            "\\end{{tabular}}\n",
            "\\label{{tab:did}}\n",
            "\\end{{table}}",
        ),
        res.gamma,
        res.gamma_exp,
        res.se,
        res.ci_lower,
        res.ci_upper,
        res.ci_lower_exp,
        res.ci_upper_exp,
    )
}

/// Human-readable summary printed after estimation.
pub fn console_summary(res: &DidResult) -> String {
    format!(
        "DID Results (Log Scale)\n\
         =======================\n\
         Gamma hat: {:.4}\n\
         Std Error: {:.4}\n\
         95% CI: [{:.4}, {:.4}]",
        res.gamma, res.se, res.ci_lower, res.ci_upper
    )
}

/// Write a text file, creating parent directories.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    create_parent(path)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

/// Write pretty JSON, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_text(path, &serde_json::to_string_pretty(value)?)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    h.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone, Serialize)]
struct Manifest {
    bundle_version: u32,
    files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize)]
struct ManifestFile {
    path: String,
    bytes: u64,
    sha256: String,
}

/// Record size and SHA-256 of every produced artifact, sorted by path.
pub fn write_manifest(path: &Path, artifacts: &[PathBuf]) -> Result<()> {
    let mut files = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let bytes = std::fs::read(artifact)
            .with_context(|| format!("reading artifact {}", artifact.display()))?;
        files.push(ManifestFile {
            path: artifact.display().to_string(),
            bytes: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    write_json(path, &Manifest { bundle_version: 1, files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps_inference::did_from_diffs;

    fn scenario() -> DidResult {
        did_from_diffs(&[0.1, 0.2, 0.3], &[0.0, 0.05, 0.1]).unwrap()
    }

    #[test]
    fn summary_lines() {
        let text = console_summary(&scenario());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "DID Results (Log Scale)",
                "=======================",
                "Gamma hat: 0.1500",
                "Std Error: 0.0645",
                "95% CI: [0.0235, 0.2765]",
            ]
        );
    }

    #[test]
    fn latex_markup() {
        let tex = latex_table(&scenario());
        assert!(tex.starts_with("\\begin{table}[h]\n\\centering\n"));
        assert!(tex.contains(
            "\\caption{Difference-in-Differences Estimate of the Effect of Paid Search on Revenue}"
        ));
        assert!(tex.contains("\\begin{tabular}{lcc}"));
        assert!(tex.contains("& Log Scale & Levels (exp) \\\\"));
        assert!(tex.contains("Point Estimate ($\\hat{\\gamma}$) & $0.1500$ & $1.1618$ \\\\"));
        assert!(tex.contains("Standard Error & $0.0645$ & --- \\\\"));
        assert!(tex.contains("95\\% CI & $[0.0235, \\; 0.2765]$ & $[1.0238, \\; 1.3185]$ \\\\"));
        assert!(tex.ends_with("\\label{tab:did}\n\\end{table}"));
        assert_eq!(tex.matches("\\hline").count(), 3);
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
