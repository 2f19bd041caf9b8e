use crate::domain::model::Language;
use crate::utils::error::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

/// Script stubs created under `src/`, in workflow order.
pub const SCRIPT_STUBS: &[&str] = &[
    "data_collection",
    "preprocessing",
    "modeling",
    "visualization",
];

/// Create per-language script stubs under `src/`, plus a `workflow` entry
/// script that calls the stubs in order. Existing files are never overwritten.
pub fn create_scripts(language: Language, src_dir: &Path) -> Result<()> {
    match language {
        Language::Python => {
            for name in SCRIPT_STUBS {
                write_if_absent(&src_dir.join(format!("{}.py", name)), &python_stub(name))?;
            }
            write_if_absent(&src_dir.join("workflow.py"), &python_workflow())?;
            write_if_absent(&src_dir.join("__init__.py"), "")?;
        }
        Language::R => {
            for name in SCRIPT_STUBS {
                write_if_absent(&src_dir.join(format!("{}.R", name)), &r_stub(name))?;
            }
            write_if_absent(&src_dir.join("workflow.R"), &r_workflow())?;
        }
        Language::None => {
            tracing::info!("No programming language selected; skipping script stubs");
        }
    }
    Ok(())
}

/// Create a starter notebook: `.ipynb` for Python, `.Rmd` for R.
pub fn create_notebooks(language: Language, notebooks_dir: &Path) -> Result<()> {
    match language {
        Language::Python => {
            let notebook = json!({
                "cells": [
                    {
                        "cell_type": "markdown",
                        "metadata": {},
                        "source": ["# Workbook\n", "\n", "Exploratory analysis for this project.\n"]
                    },
                    {
                        "cell_type": "code",
                        "execution_count": null,
                        "metadata": {},
                        "outputs": [],
                        "source": ["import sys\n", "sys.path.append(\"../src\")\n"]
                    }
                ],
                "metadata": {
                    "kernelspec": {
                        "display_name": "Python 3",
                        "language": "python",
                        "name": "python3"
                    },
                    "language_info": { "name": "python" }
                },
                "nbformat": 4,
                "nbformat_minor": 5
            });
            let path = notebooks_dir.join("workbook.ipynb");
            if !path.exists() {
                fs::write(&path, serde_json::to_string_pretty(&notebook)?)?;
            }
        }
        Language::R => {
            write_if_absent(
                &notebooks_dir.join("workbook.Rmd"),
                "---\ntitle: \"Workbook\"\noutput: html_document\n---\n\n```{r}\nsource(\"../src/workflow.R\")\n```\n",
            )?;
        }
        Language::None => {}
    }
    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, content)?;
    Ok(())
}

fn python_stub(name: &str) -> String {
    format!(
        "\"\"\"{} step.\"\"\"\n\n\ndef main():\n    pass\n\n\nif __name__ == \"__main__\":\n    main()\n",
        name.replace('_', " ")
    )
}

fn python_workflow() -> String {
    let imports: Vec<String> = SCRIPT_STUBS
        .iter()
        .map(|s| format!("import {}", s))
        .collect();
    let calls: Vec<String> = SCRIPT_STUBS.iter().map(|s| format!("    {}.main()", s)).collect();
    format!(
        "\"\"\"Run the full analysis workflow.\"\"\"\n\n{}\n\n\ndef main():\n{}\n\n\nif __name__ == \"__main__\":\n    main()\n",
        imports.join("\n"),
        calls.join("\n")
    )
}

fn r_stub(name: &str) -> String {
    format!("# {} step\n\nmain <- function() {{\n}}\n", name.replace('_', " "))
}

fn r_workflow() -> String {
    let sources: Vec<String> = SCRIPT_STUBS
        .iter()
        .map(|s| format!("source(\"{}.R\")", s))
        .collect();
    format!("# Run the full analysis workflow\n\n{}\n", sources.join("\n"))
}
