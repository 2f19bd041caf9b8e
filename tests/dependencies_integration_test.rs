mod common;

use common::ScriptedRunner;
use repro_scaffold::core::dependencies;
use std::fs;
use tempfile::TempDir;

fn scripted_python() -> ScriptedRunner {
    ScriptedRunner::new(&["python3"])
        .with_response("python3 --version", 0, "Python 3.11.4\n", "")
        .with_response(
            "python3 -m pip freeze",
            0,
            "numpy==1.26.4\npandas==2.2.0\nSciPy==1.11.0\n",
            "",
        )
}

#[tokio::test]
async fn update_dependencies_writes_manifests_and_requirements() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();
    fs::create_dir_all(project.join("src")).unwrap();
    fs::create_dir_all(project.join("notebooks")).unwrap();

    fs::write(
        project.join("src/analysis.py"),
        "import os\nimport numpy as np\nimport helpers\nimport mysterypkg\nfrom pandas import DataFrame\n",
    )
    .unwrap();
    fs::write(project.join("src/helpers.py"), "import json\n").unwrap();
    let notebook = serde_json::json!({
        "cells": [
            {"cell_type": "code", "source": ["import scipy\n"], "metadata": {}, "outputs": [], "execution_count": null}
        ],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5
    });
    fs::write(project.join("notebooks/workbook.ipynb"), notebook.to_string()).unwrap();

    let runner = scripted_python();
    dependencies::update_dependencies(&runner, project).await.unwrap();

    let src_manifest = fs::read_to_string(project.join("src/dependencies.txt")).unwrap();
    assert!(src_manifest.contains("Python 3.11.4"));
    assert!(src_manifest.contains("numpy==1.26.4"));
    assert!(src_manifest.contains("pandas==2.2.0"));
    assert!(src_manifest.contains("mysterypkg==Not available"));
    assert!(src_manifest.contains("Files checked:\nanalysis.py\nhelpers.py"));
    // Stdlib modules and sibling scripts are not dependencies.
    assert!(!src_manifest.contains("os=="));
    assert!(!src_manifest.contains("json=="));
    assert!(!src_manifest.contains("helpers=="));

    let nb_manifest = fs::read_to_string(project.join("notebooks/dependencies.txt")).unwrap();
    assert!(nb_manifest.contains("scipy==1.11.0"));

    let requirements = fs::read_to_string(project.join("requirements.txt")).unwrap();
    assert!(requirements.contains("numpy==1.26.4"));
    assert!(requirements.contains("pandas==2.2.0"));
    assert!(requirements.contains("scipy==1.11.0"));
    assert!(!requirements.contains("mysterypkg"), "unresolved packages are never pinned");

    let readme = fs::read_to_string(project.join("README.md")).unwrap();
    assert!(readme.contains("### Software Requirements"));
    assert!(readme.contains("#### **src**"));
    assert!(readme.contains("#### **notebooks**"));
    assert!(readme.contains("**Python 3.11.4**"));
    assert!(readme.contains("- numpy: 1.26.4"));
    // The section is parsed back out of the written manifests, install
    // command included.
    assert!(readme.contains("'pip install -r requirements.txt'"));
}

#[tokio::test]
async fn python_version_banner_on_stderr_is_still_read() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(project.join("src/analysis.py"), "import numpy\n").unwrap();

    let runner = ScriptedRunner::new(&["python3"])
        .with_response("python3 --version", 0, "", "Python 2.7.18\n")
        .with_response("python3 -m pip freeze", 0, "numpy==1.16.6\n", "");
    dependencies::update_dependencies(&runner, project).await.unwrap();

    let manifest = fs::read_to_string(project.join("src/dependencies.txt")).unwrap();
    assert!(manifest.contains("Python 2.7.18"));
    assert!(manifest.contains("numpy==1.16.6"));
}

#[tokio::test]
async fn update_dependencies_reports_versions_unavailable_without_python() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(project.join("src/analysis.py"), "import numpy\n").unwrap();

    let runner = ScriptedRunner::new(&[]);
    dependencies::update_dependencies(&runner, project).await.unwrap();

    let manifest = fs::read_to_string(project.join("src/dependencies.txt")).unwrap();
    assert!(manifest.contains("Python (version unknown)"));
    assert!(manifest.contains("numpy==Not available"));

    let requirements = fs::read_to_string(project.join("requirements.txt")).unwrap();
    assert!(requirements.trim().is_empty());
}

#[tokio::test]
async fn update_dependencies_skips_a_project_without_sources() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();
    fs::create_dir_all(project.join("src")).unwrap();

    let runner = scripted_python();
    dependencies::update_dependencies(&runner, project).await.unwrap();

    assert!(!project.join("requirements.txt").exists());
    assert!(!project.join("README.md").exists());
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn update_readme_requirements_section_replaces_in_place() {
    let dir = TempDir::new().unwrap();
    let project = dir.path();
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(project.join("src/analysis.py"), "import numpy\n").unwrap();
    fs::write(
        project.join("README.md"),
        "# Demo\n\n### Software Requirements\n\nstale\n\n## License\nMIT\n",
    )
    .unwrap();

    let runner = scripted_python();
    dependencies::update_dependencies(&runner, project).await.unwrap();

    let readme = fs::read_to_string(project.join("README.md")).unwrap();
    assert!(!readme.contains("stale"));
    assert!(readme.contains("- numpy: 1.26.4"));
    assert!(readme.contains("## License\nMIT"), "following sections survive the splice");
}
