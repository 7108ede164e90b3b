//! The disbursement record and the immutable dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Header of the date column.
pub const DATE_COLUMN: &str = "data";
pub const STATE_COLUMN: &str = "Estado";
pub const MUNICIPALITY_COLUMN: &str = "Município";
pub const BANK_COLUMN: &str = "Banco Comunitário";

/// Every numeric column of the sheet.
/// The discriminant is the index into `Record::metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalCredit = 0,
    Withdrawals = 1,
    CurrencyInCirculation = 2,
    LocalCommerceSpend = 3,
    BillPayments = 4,
    PeopleBenefited = 5,
    MicrocreditUsage = 6,
    SocialProjectUsage = 7,
    ActiveMerchants = 8,
    MerchantsWithSales = 9,
    CurrencyTrust = 10,
}

pub const METRIC_COUNT: usize = 11;

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Self::TotalCredit,
        Self::Withdrawals,
        Self::CurrencyInCirculation,
        Self::LocalCommerceSpend,
        Self::BillPayments,
        Self::PeopleBenefited,
        Self::MicrocreditUsage,
        Self::SocialProjectUsage,
        Self::ActiveMerchants,
        Self::MerchantsWithSales,
        Self::CurrencyTrust,
    ];

    /// Exact spreadsheet header (after trimming).
    pub fn header(&self) -> &'static str {
        match self {
            Self::TotalCredit           => "CRÉDITO TOTAL",
            Self::Withdrawals           => "Saques",
            Self::CurrencyInCirculation => "Moeda social em circulação",
            Self::LocalCommerceSpend    => "VALOR GASTO NO COMÉRCIO LOCAL",
            Self::BillPayments          => "PAGAMENTO DE BOLETOS/CONVÊNIOS",
            Self::PeopleBenefited       => "Número de pessoas beneficiadas pelo legado",
            Self::MicrocreditUsage      => "Uso do legado em Microcrédito",
            Self::SocialProjectUsage    => "Uso do legado em Projetos Sociais",
            Self::ActiveMerchants       => "NÚMERO DE COMÉRCIOS CREDENCIADOS ATIVOS",
            Self::MerchantsWithSales    => "NÚMERO DE COMÉRCIOS COM VENDA",
            Self::CurrencyTrust         => "GRAU DE CONFIANÇA NA MOEDA",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One disbursement observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub state: String,
    pub municipality: String,
    pub community_bank: String,
    pub metrics: [f64; METRIC_COUNT],
    pub latitude: f64,
    pub longitude: f64,
}

impl Record {
    /// A record with every metric at zero and coordinates at the origin.
    pub fn new(
        date: NaiveDate,
        state: impl Into<String>,
        municipality: impl Into<String>,
        community_bank: impl Into<String>,
    ) -> Self {
        Self {
            date,
            state: state.into(),
            municipality: municipality.into(),
            community_bank: community_bank.into(),
            metrics: [0.0; METRIC_COUNT],
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        self.set_metric(metric, value);
        self
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        self.metrics[metric.index()]
    }

    pub fn set_metric(&mut self, metric: Metric, value: f64) {
        self.metrics[metric.index()] = value;
    }
}

/// The loaded record set. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest date present, or None when empty.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }
}
