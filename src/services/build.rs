use crate::models::{
    BuildReport, BuildSettings, InvocationOutcome, InvocationStatus, NameTemplate, PackageReport,
    Tool, ToolKind,
};
use crate::services::bindings::BindingRewriter;
use crate::services::discovery::{
    PY_EXTENSION, QRC_EXTENSION, TS_EXTENSION, UI_EXTENSION, find_files,
};
use crate::services::runner::{Invocation, ProcessRunner, ToolError, ToolRunner};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::fs;
use std::time::Instant;
use thiserror::Error;

/// Errors that stop a build before any tool runs
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Package \"{0}\" not found!")]
    PackageNotFound(Utf8PathBuf),
}

/// Compiles Qt resources, UI forms and translations for every configured package.
///
/// Packages are handled one after another in configuration order, each going
/// through up to four phases:
///
/// 1. `.qrc` → Python module via the resource compiler
/// 2. `.ui` → Python module via the UI compiler, then binding imports rewritten
/// 3. `.ts` catalogs updated from Python sources (only with languages configured)
/// 4. `.ts` catalogs released to `.qm` (only with languages configured)
///
/// A tool that fails is logged and recorded in the [`BuildReport`]; the run
/// carries on with the next file. Only a missing package directory or a
/// filesystem error aborts the run.
pub struct BuildService<R = ProcessRunner> {
    settings: BuildSettings,
    runner: R,
    rewriter: Option<BindingRewriter>,
}

impl BuildService<ProcessRunner> {
    /// Create a service that runs real subprocesses
    pub fn new(settings: BuildSettings) -> Result<Self> {
        let runner = ProcessRunner::with_timeout(settings.tool_timeout());
        Self::with_runner(settings, runner)
    }
}

impl<R: ToolRunner> BuildService<R> {
    pub fn with_runner(settings: BuildSettings, runner: R) -> Result<Self> {
        let rewriter = BindingRewriter::from_settings(&settings)
            .context("Failed to build binding import pattern")?;

        Ok(Self {
            settings,
            runner,
            rewriter,
        })
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Check that every package is an existing directory
    pub fn validate_packages(&self) -> Result<()> {
        for package in self.settings.packages() {
            if !package.is_dir() {
                return Err(BuildError::PackageNotFound(package.clone()).into());
            }
        }
        Ok(())
    }

    /// Run every phase for every package
    pub async fn run(&self) -> Result<BuildReport> {
        self.validate_packages()?;

        let mut report = BuildReport::default();
        for package in self.settings.packages() {
            let package_report = report.package_mut(package.as_str());
            self.build_package(package, package_report).await?;
        }

        tracing::info!("Build finished: {}", report.summary());
        Ok(report)
    }

    /// Run the enabled phases for a single package
    pub async fn build_package(&self, package: &Utf8Path, report: &mut PackageReport) -> Result<()> {
        if let Some(tool) = self.settings.tool(ToolKind::ResourceCompiler) {
            self.compile_resources(package, tool, report).await?;
        }

        if let Some(tool) = self.settings.tool(ToolKind::UiCompiler) {
            self.compile_forms(package, tool, report).await?;
        }

        if self.settings.languages().is_empty() {
            tracing::debug!("No languages configured, skipping translations for {}", package);
            return Ok(());
        }

        if let Some(tool) = self.settings.tool(ToolKind::TranslationUpdater) {
            self.update_translations(package, tool, report).await?;
        }

        if let Some(tool) = self.settings.tool(ToolKind::TranslationReleaser) {
            self.release_translations(package, tool, report).await?;
        }

        Ok(())
    }

    async fn compile_resources(
        &self,
        package: &Utf8Path,
        tool: &Tool,
        report: &mut PackageReport,
    ) -> Result<()> {
        tracing::info!("compiling {} Qt resource files...", package);

        for source in find_files(package, QRC_EXTENSION)? {
            let output = compiled_path(&source, self.settings.qrc_template());
            let invocation = Invocation::new(tool)
                .args(["-o", output.as_str(), source.as_str()]);

            let outcome = self.invoke(&invocation, source.to_string()).await;
            if !outcome.status.is_success() {
                tracing::error!("error compiling .qrc file: {}", source);
            }
            report.record(outcome);
        }

        Ok(())
    }

    async fn compile_forms(
        &self,
        package: &Utf8Path,
        tool: &Tool,
        report: &mut PackageReport,
    ) -> Result<()> {
        tracing::info!("compiling {} Qt UI files...", package);

        for source in find_files(package, UI_EXTENSION)? {
            let output = compiled_path(&source, self.settings.ui_template());
            let invocation = Invocation::new(tool)
                .args(["-o", output.as_str(), source.as_str()]);

            let outcome = self.invoke(&invocation, source.to_string()).await;
            let succeeded = outcome.status.is_success();
            report.record(outcome);

            if !succeeded {
                tracing::error!("error compiling .ui file: {}", source);
                continue;
            }

            if let Some(rewriter) = &self.rewriter
                && rewriter.rewrite_file(&output)?
            {
                report.rewritten += 1;
            }
        }

        Ok(())
    }

    async fn update_translations(
        &self,
        package: &Utf8Path,
        tool: &Tool,
        report: &mut PackageReport,
    ) -> Result<()> {
        tracing::info!("updating {} Qt translation files...", package);

        let languages_path = package.join(self.settings.languages_dir());
        if !languages_path.exists() {
            fs::create_dir_all(&languages_path).with_context(|| {
                format!("Failed to create translations directory: {}", languages_path)
            })?;
        }

        let sources = find_files(package, PY_EXTENSION)?;
        let catalogs = self.translation_catalogs(package)?;
        let target = join_paths(&catalogs);

        let invocation = Invocation::new(tool)
            .args(sources.iter().map(|path| path.as_str()))
            .arg("-ts")
            .args(catalogs.iter().map(|path| path.as_str()));

        let outcome = self.invoke(&invocation, target).await;
        if !outcome.status.is_success() {
            tracing::error!("error updating .ts files: {}", outcome.target);
        }
        report.record(outcome);

        Ok(())
    }

    async fn release_translations(
        &self,
        package: &Utf8Path,
        tool: &Tool,
        report: &mut PackageReport,
    ) -> Result<()> {
        tracing::info!("compiling {} Qt translation files...", package);

        let catalogs = find_files(package, TS_EXTENSION)?;
        if catalogs.is_empty() {
            tracing::warn!("No .ts files found in {}, nothing to release", package);
            return Ok(());
        }

        let invocation = Invocation::new(tool).args(catalogs.iter().map(|path| path.as_str()));

        let outcome = self.invoke(&invocation, join_paths(&catalogs)).await;
        if !outcome.status.is_success() {
            tracing::error!("error compiling .ts files: {}", outcome.target);
        }
        report.record(outcome);

        Ok(())
    }

    /// Catalogs expected from the configured languages:
    /// `<package>/<languages_dir>/<filename-ts>`
    pub fn expected_catalogs(&self, package: &Utf8Path) -> Vec<Utf8PathBuf> {
        let languages_path = package.join(self.settings.languages_dir());
        let package_name = package_name(package);

        self.settings
            .languages()
            .iter()
            .map(|lang| {
                languages_path.join(self.settings.ts_template().render_catalog(&package_name, lang))
            })
            .collect()
    }

    /// Existing `.ts` files under `package` plus the expected ones, sorted and
    /// without duplicates
    pub fn translation_catalogs(&self, package: &Utf8Path) -> Result<BTreeSet<Utf8PathBuf>> {
        let mut catalogs: BTreeSet<Utf8PathBuf> =
            find_files(package, TS_EXTENSION)?.into_iter().collect();
        catalogs.extend(self.expected_catalogs(package));
        Ok(catalogs)
    }

    async fn invoke(&self, invocation: &Invocation, target: String) -> InvocationOutcome {
        tracing::info!("Executing: {}", invocation.command_line());

        let start = Instant::now();
        let status = match self.runner.run(invocation).await {
            Ok(0) => InvocationStatus::Succeeded,
            Ok(exit_code) => {
                tracing::debug!("{} exited with code {}", invocation.program, exit_code);
                InvocationStatus::Failed { exit_code }
            }
            Err(ToolError::Timeout(limit)) => InvocationStatus::TimedOut(limit),
            Err(e) => {
                tracing::error!("{}", e);
                InvocationStatus::Error(e.to_string())
            }
        };

        InvocationOutcome {
            tool: invocation.tool,
            target,
            status,
            duration: start.elapsed(),
        }
    }
}

/// Output path for a compiled `.qrc`/`.ui` file, next to its source
pub fn compiled_path(source: &Utf8Path, template: &NameTemplate) -> Utf8PathBuf {
    let stem = source.file_stem().unwrap_or_default();
    source.with_file_name(template.render_module(stem))
}

/// Value of `{package}` in catalog names: the package directory's own name
pub fn package_name(package: &Utf8Path) -> String {
    if let Some(name) = package.file_name() {
        return name.to_string();
    }

    package
        .canonicalize_utf8()
        .ok()
        .and_then(|path| path.file_name().map(str::to_string))
        .unwrap_or_else(|| package.to_string())
}

fn join_paths<'a>(paths: impl IntoIterator<Item = &'a Utf8PathBuf>) -> String {
    paths
        .into_iter()
        .map(|path| path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
