/// Days in every fiscal year
pub const FISCAL_YEAR_DAYS: u32 = 364;

/// Days in a fiscal week
pub const DAYS_IN_WEEK: u16 = 7;

/// Fiscal months per fiscal year
pub const MONTHS_IN_FISCAL_YEAR: usize = 12;
/// Highest fiscal month number
pub const MAX_FISCAL_MONTH: u8 = 12;

/// Highest week number a fiscal month can hold (35-day months)
pub const MAX_WEEKS_IN_MONTH: u8 = 5;

/// Length of a four-week fiscal month
pub const SHORT_MONTH_DAYS: u16 = 28;
/// Length of a five-week fiscal month
pub const LONG_MONTH_DAYS: u16 = 35;

/// The 4-4-5 pattern, month by month.
/// Used for any fiscal year without an explicit history record.
pub const STANDARD_MONTH_LENGTHS: [u16; MONTHS_IN_FISCAL_YEAR] = [
    28, // month 1
    35, // month 2
    28, // month 3
    28, // month 4
    35, // month 5
    28, // month 6
    28, // month 7
    35, // month 8
    28, // month 9
    28, // month 10
    35, // month 11
    28, // month 12
];

/// Fiscal year of the bootstrap history record
pub const DEFAULT_FISCAL_YEAR: i32 = 2018;
/// Calendar start of the bootstrap fiscal year (February 4, 2018)
pub const DEFAULT_START_YEAR: i32 = 2018;
pub const DEFAULT_START_MONTH: u32 = 2;
pub const DEFAULT_START_DAY: u32 = 4;

/// Where the history document lives unless told otherwise
pub const DEFAULT_CONFIG_PATH: &str = "config/FISCAL_YEAR.config";

/// Indentation used when writing the history document
pub(crate) const CONFIG_INDENT: &[u8] = b"   ";
