//! Display strings for the supported interface languages.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "el")]
    Greek,
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "el" | "gr" | "greek" => Ok(Language::Greek),
            _ => Err(anyhow::anyhow!("Unsupported language: {s}")),
        }
    }
}

/// Every user-facing label.
#[derive(Debug)]
pub struct Strings {
    pub title: &'static str,
    pub historical: &'static str,
    pub alerts: &'static str,
    pub result: &'static str,
    pub currency: &'static str,
    pub rate: &'static str,
    pub source: &'static str,
    pub provider: &'static str,
    pub status: &'static str,
    pub fetched: &'static str,
    pub unavailable: &'static str,
    pub disabled: &'static str,
    pub fetching: &'static str,
    pub no_data: &'static str,
    pub no_history: &'static str,
    pub alerts_placeholder: &'static str,
    pub no_api_warning: &'static str,
    pub projected: &'static str,
    pub days: &'static str,
    pub date: &'static str,
    pub close: &'static str,
    pub change: &'static str,
    pub low: &'static str,
    pub high: &'static str,
    pub shell_prompt: &'static str,
    pub shell_usage: &'static str,
}

static ENGLISH: Strings = Strings {
    title: "Advanced Currency Analytics",
    historical: "Historical Trends",
    alerts: "Rate Alerts",
    result: "Result",
    currency: "Currency",
    rate: "Rate",
    source: "Source",
    provider: "Provider",
    status: "Status",
    fetched: "ok",
    unavailable: "unavailable",
    disabled: "disabled",
    fetching: "Fetching rates...",
    no_data: "No exchange rate data found!",
    no_history: "No historical data available for",
    alerts_placeholder: "Rate alerts require an API key (enable Alpha Vantage).",
    no_api_warning: "Using free ECB/CoinGecko data (limited)",
    projected: "Projected rate",
    days: "days",
    date: "Date",
    close: "Close",
    change: "Change",
    low: "Low",
    high: "High",
    shell_prompt: "Enter AMOUNT FROM TO (empty line to quit)",
    shell_usage: "Expected: AMOUNT FROM TO, e.g. 100 USD EUR",
};

static GREEK: Strings = Strings {
    title: "Προηγμένος Μετρητής & Ανάλυση Νομισμάτων",
    historical: "Ιστορικά Δεδομένα",
    alerts: "Ειδοποιήσεις",
    result: "Αποτέλεσμα",
    currency: "Νόμισμα",
    rate: "Ισοτιμία",
    source: "Πηγή",
    provider: "Πάροχος",
    status: "Κατάσταση",
    fetched: "εντάξει",
    unavailable: "μη διαθέσιμη",
    disabled: "ανενεργή",
    fetching: "Λήψη ισοτιμιών...",
    no_data: "Δεν βρέθηκαν δεδομένα!",
    no_history: "Δεν υπάρχουν ιστορικά δεδομένα για",
    alerts_placeholder: "Αυτή η λειτουργικότητα απαιτεί API Key (ενεργοποιήστε το Alpha Vantage)",
    no_api_warning: "Χρήση δωρεάν δεδομένων ECB/CoinGecko (περιορισμένα)",
    projected: "Προβλεπόμενη τιμή",
    days: "ημέρες",
    date: "Ημερομηνία",
    close: "Κλείσιμο",
    change: "Μεταβολή",
    low: "Χαμηλό",
    high: "Υψηλό",
    shell_prompt: "Εισάγετε ΠΟΣΟ ΑΠΟ ΣΕ (κενή γραμμή για έξοδο)",
    shell_usage: "Αναμένεται: ΠΟΣΟ ΑΠΟ ΣΕ, π.χ. 100 USD EUR",
};

impl Language {
    pub fn strings(&self) -> &'static Strings {
        match self {
            Language::English => &ENGLISH,
            Language::Greek => &GREEK,
        }
    }

    /// The other language, as flipped by the ΕΛ/EN toggle.
    pub fn toggled(&self) -> Self {
        match self {
            Language::English => Language::Greek,
            Language::Greek => Language::English,
        }
    }
}
