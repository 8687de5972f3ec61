use bitflags::bitflags;

bitflags! {
    /// Legacy compile-option bits.
    ///
    /// Bit values match the classic flag-based compiler interface so that
    /// existing call sites can pass their masks unchanged.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct CompileFlags: u32 {
        const DEBUG = 1 << 0;
        const SKIP_VALIDATION = 1 << 1;
        const SKIP_OPTIMIZATION = 1 << 2;
        const PACK_MATRIX_ROW_MAJOR = 1 << 3;
        const PACK_MATRIX_COLUMN_MAJOR = 1 << 4;
        const PARTIAL_PRECISION = 1 << 5;
        const FORCE_VS_SOFTWARE_NO_OPT = 1 << 6;
        const FORCE_PS_SOFTWARE_NO_OPT = 1 << 7;
        const NO_PRESHADER = 1 << 8;
        const AVOID_FLOW_CONTROL = 1 << 9;
        const PREFER_FLOW_CONTROL = 1 << 10;
        const ENABLE_STRICTNESS = 1 << 11;
        const ENABLE_BACKWARDS_COMPATIBILITY = 1 << 12;
        const IEEE_STRICTNESS = 1 << 13;
        const OPTIMIZATION_LEVEL0 = 1 << 14;
        const OPTIMIZATION_LEVEL1 = 0;
        const OPTIMIZATION_LEVEL2 = (1 << 14) | (1 << 15);
        const OPTIMIZATION_LEVEL3 = 1 << 15;
        const WARNINGS_ARE_ERRORS = 1 << 18;
        const RESOURCES_MAY_ALIAS = 1 << 19;
        const ENABLE_UNBOUNDED_DESCRIPTOR_TABLES = 1 << 20;
        const ALL_RESOURCES_BOUND = 1 << 21;
        const DEBUG_NAME_FOR_SOURCE = 1 << 22;
        const DEBUG_NAME_FOR_BINARY = 1 << 23;
    }
}

/// Two-bit field holding the optimization level.
const OPTIMIZATION_MASK: u32 = CompileFlags::OPTIMIZATION_LEVEL2.bits();

/// One row of the translation table.
///
/// A row applies when `flags & mask == value`. Single-bit flags use the same
/// bit for both; the optimization level rows compare the whole two-bit field,
/// which keeps the three levels mutually exclusive.
#[derive(Debug, Copy, Clone)]
pub struct FlagArgument {
    pub mask: u32,
    pub value: u32,
    pub tokens: &'static [&'static str],
}

const fn bit(flag: CompileFlags, tokens: &'static [&'static str]) -> FlagArgument {
    FlagArgument {
        mask: flag.bits(),
        value: flag.bits(),
        tokens,
    }
}

const fn level(flag: CompileFlags, tokens: &'static [&'static str]) -> FlagArgument {
    FlagArgument {
        mask: OPTIMIZATION_MASK,
        value: flag.bits(),
        tokens,
    }
}

/// Ordered legacy flag → argument table.
///
/// Level 1 is the field value 0 and has no entry: it is the backend default.
/// `-Qembed_debug` rides along with `/Zi` so the backend embeds debug data
/// instead of warning about a missing PDB output.
pub static FLAG_ARGUMENTS: [FlagArgument; 12] = [
    bit(CompileFlags::ENABLE_STRICTNESS, &["/Ges"]),
    bit(CompileFlags::IEEE_STRICTNESS, &["/Gis"]),
    level(CompileFlags::OPTIMIZATION_LEVEL0, &["/O0"]),
    level(CompileFlags::OPTIMIZATION_LEVEL2, &["/O2"]),
    level(CompileFlags::OPTIMIZATION_LEVEL3, &["/O3"]),
    bit(CompileFlags::WARNINGS_ARE_ERRORS, &["/WX"]),
    bit(CompileFlags::DEBUG, &["/Zi", "-Qembed_debug"]),
    bit(CompileFlags::PACK_MATRIX_ROW_MAJOR, &["/Zpr"]),
    bit(CompileFlags::PACK_MATRIX_COLUMN_MAJOR, &["/Zpc"]),
    bit(CompileFlags::AVOID_FLOW_CONTROL, &["/Gfa"]),
    bit(CompileFlags::PREFER_FLOW_CONTROL, &["/Gfp"]),
    bit(CompileFlags::RESOURCES_MAY_ALIAS, &["/res_may_alias"]),
];

/// Translates legacy flags to backend arguments in table order.
///
/// Bits without a row are dropped.
pub fn to_arguments(flags: CompileFlags) -> Vec<&'static str> {
    if flags.contains(CompileFlags::PARTIAL_PRECISION) {
        log::debug!("partial precision is not supported by the shader backend; ignoring");
    }

    let bits = flags.bits();
    FLAG_ARGUMENTS
        .iter()
        .filter(|row| bits & row.mask == row.value)
        .flat_map(|row| row.tokens.iter().copied())
        .collect()
}

/// Every token the table can produce.
pub fn argument_vocabulary() -> impl Iterator<Item = &'static str> {
    FLAG_ARGUMENTS.iter().flat_map(|row| row.tokens.iter().copied())
}
