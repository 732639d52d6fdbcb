//! Optimization-pipeline options and their backend compiler flags.
//!
//! [`map_codegen_options`] is a pure function: every recognized option is
//! checked independently and appended in a fixed order, ending with
//! `-Wno-unused-command-line-argument` so backends tolerate flags that do
//! not apply to IR input.

use std::fmt;

/// Backend optimization level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationLevel {
    O0,
    O1,
    /// Default for link-time code generation.
    #[default]
    O2,
    O3,
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::O0 => write!(f, "O0"),
            Self::O1 => write!(f, "O1"),
            Self::O2 => write!(f, "O2"),
            Self::O3 => write!(f, "O3"),
        }
    }
}

/// Floating-point ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatAbi {
    #[default]
    Default,
    Soft,
    Hard,
}

/// Relocation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocModel {
    Static,
    Pic,
    DynamicNoPic,
    Ropi,
    Rwpi,
    RopiRwpi,
}

/// Code model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeModel {
    Tiny,
    Small,
    Kernel,
    Medium,
    Large,
}

impl CodeModel {
    /// The `-mcmodel=` spelling, for models the driver accepts.
    fn driver_name(self) -> Option<&'static str> {
        match self {
            Self::Kernel => Some("kernel"),
            Self::Large => Some("large"),
            Self::Medium => Some("medium"),
            Self::Small => Some("small"),
            Self::Tiny => None,
        }
    }
}

/// Codegen-relevant settings of the link-time optimization pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    pub opt_level: OptimizationLevel,
    /// Emit address-significance tables.
    pub emit_addrsig: bool,
    pub function_sections: bool,
    pub data_sections: bool,
    pub unique_basic_block_section_names: bool,
    pub float_abi: FloatAbi,
    pub reloc_model: Option<RelocModel>,
    pub code_model: Option<CodeModel>,
    /// Warn on profile-data mismatches.
    pub pgo_warn_mismatch: bool,
    /// Context-sensitive PGO instrumentation.
    pub cs_profile_generate: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            opt_level: OptimizationLevel::default(),
            emit_addrsig: false,
            function_sections: false,
            data_sections: false,
            unique_basic_block_section_names: false,
            float_abi: FloatAbi::Default,
            reloc_model: None,
            code_model: None,
            pgo_warn_mismatch: true,
            cs_profile_generate: false,
        }
    }
}

/// Flags for the host platform.
pub fn map_codegen_options(options: &CodegenOptions) -> Vec<String> {
    map_codegen_options_for(options, cfg!(windows))
}

/// Flags for a host that is (or is not) Windows, where code is always
/// position independent and `-fpic` is rejected.
pub fn map_codegen_options_for(options: &CodegenOptions, windows_host: bool) -> Vec<String> {
    let mut args = vec![format!("-{}", options.opt_level)];

    if options.emit_addrsig {
        args.push("-faddrsig".to_string());
    }
    if options.function_sections {
        args.push("-ffunction-sections".to_string());
    }
    if options.data_sections {
        args.push("-fdata-sections".to_string());
    }
    if options.unique_basic_block_section_names {
        args.push("-funique-basic-block-section-names".to_string());
    }

    match options.float_abi {
        FloatAbi::Hard => args.push("-ffp-model=hard".to_string()),
        FloatAbi::Soft => args.push("-ffp-model=soft".to_string()),
        FloatAbi::Default => {}
    }

    match options.reloc_model {
        Some(RelocModel::Pic) if !windows_host => args.push("-fpic".to_string()),
        Some(RelocModel::Ropi) => args.push("-fropi".to_string()),
        Some(RelocModel::Rwpi) => args.push("-frwpi".to_string()),
        _ => {}
    }

    if let Some(model) = options.code_model.and_then(CodeModel::driver_name) {
        args.push(format!("-mcmodel={model}"));
    }

    if !options.pgo_warn_mismatch {
        args.push("-mllvm".to_string());
        args.push("-no-pgo-warn-mismatch".to_string());
    }
    if options.cs_profile_generate {
        args.push("-fcs-profile-generate".to_string());
    }

    args.push("-Wno-unused-command-line-argument".to_string());
    args
}
