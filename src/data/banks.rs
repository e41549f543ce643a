//! Bank catalog: display names, home pages, and synthetic rate ranges.

/// Uniform range `[base, base + span)` in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRange {
    pub base: f64,
    pub span: f64,
}

impl RateRange {
    pub const fn new(base: f64, span: f64) -> Self {
        Self { base, span }
    }

    /// Value at position `u ∈ [0, 1)` in the range.
    pub fn at(self, u: f64) -> f64 {
        self.base + u * self.span
    }
}

/// Ranges used when a bank's page yields no rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticProfile {
    pub deposit: RateRange,
    pub loan: RateRange,
    pub investment_return: RateRange,
}

pub const DEFAULT_PROFILE: SyntheticProfile = SyntheticProfile {
    deposit: RateRange::new(6.0, 2.0),
    loan: RateRange::new(12.0, 3.0),
    investment_return: RateRange::new(9.0, 2.5),
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankSite {
    pub slug: &'static str,
    pub name: &'static str,
    pub url: &'static str,
    pub profile: SyntheticProfile,
}

pub const BANK_SITES: [BankSite; 8] = [
    BankSite {
        slug: "sberbank",
        name: "Sberbank",
        url: "https://www.sberbank.ru/",
        profile: SyntheticProfile {
            deposit: RateRange::new(5.0, 1.0),
            loan: RateRange::new(13.0, 2.0),
            investment_return: RateRange::new(7.5, 1.5),
        },
    },
    BankSite {
        slug: "vtb",
        name: "VTB",
        url: "https://www.vtb.ru/",
        profile: DEFAULT_PROFILE,
    },
    BankSite {
        slug: "tinkoff",
        name: "Tinkoff",
        url: "https://www.tinkoff.ru/",
        profile: SyntheticProfile {
            deposit: RateRange::new(7.0, 1.5),
            loan: RateRange::new(10.5, 1.5),
            investment_return: RateRange::new(10.5, 2.0),
        },
    },
    BankSite {
        slug: "alfabank",
        name: "Alfa-Bank",
        url: "https://www.alfabank.ru/",
        profile: SyntheticProfile {
            deposit: RateRange::new(6.2, 1.0),
            loan: RateRange::new(11.5, 2.0),
            investment_return: RateRange::new(9.5, 1.5),
        },
    },
    BankSite {
        slug: "gazprombank",
        name: "Gazprombank",
        url: "https://www.gazprombank.ru/",
        profile: DEFAULT_PROFILE,
    },
    BankSite {
        slug: "raiffeisen",
        name: "Raiffeisen",
        url: "https://www.raiffeisen.ru/",
        profile: DEFAULT_PROFILE,
    },
    BankSite {
        slug: "open",
        name: "Otkritie",
        url: "https://www.open.ru/",
        profile: SyntheticProfile {
            deposit: RateRange::new(5.8, 0.8),
            loan: RateRange::new(12.0, 2.5),
            investment_return: RateRange::new(8.7, 1.2),
        },
    },
    BankSite {
        slug: "mkb",
        name: "MKB",
        url: "https://www.mkb.ru/",
        profile: DEFAULT_PROFILE,
    },
];

/// Default term (days) for freshly collected records.
pub const DEFAULT_TERM_DAYS: u32 = 365;
