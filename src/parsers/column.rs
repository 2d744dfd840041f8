// ==========================================
// Realty Ledger - Column Header Matcher
// ==========================================
// Resolves the fixed commission-import schema against whatever
// headers the source spreadsheet carries. Synonym lists cover the
// Portuguese export headers and their English equivalents; "avoid"
// lists disambiguate near-collisions such as "PARCELAS" (count)
// vs. "VALOR PARCELA" (per-installment value).
// ==========================================

use std::collections::HashMap;
use std::fmt;

// ==========================================
// ImportField - semantic fields of the schema
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportField {
    DevelopmentName,
    Block,
    UnitNumber,
    Floor,
    ClientName,
    SaleDate,
    TotalPrice,
    SignalAmount,
    InstallmentCount,
    InstallmentValue,
    BalloonCount,
    BalloonValue,
    BrokerName,
}

impl fmt::Display for ImportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImportField::DevelopmentName => "development name",
            ImportField::Block => "block",
            ImportField::UnitNumber => "unit number",
            ImportField::Floor => "floor",
            ImportField::ClientName => "client name",
            ImportField::SaleDate => "sale date",
            ImportField::TotalPrice => "total price",
            ImportField::SignalAmount => "signal amount",
            ImportField::InstallmentCount => "installment count",
            ImportField::InstallmentValue => "installment value",
            ImportField::BalloonCount => "balloon count",
            ImportField::BalloonValue => "balloon value",
            ImportField::BrokerName => "broker name",
        };
        write!(f, "{}", label)
    }
}

// ==========================================
// ColumnSpec
// ==========================================
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub field: ImportField,
    /// Accepted header synonyms, uppercase, in preference order.
    pub synonyms: &'static [&'static str],
    /// Headers that must NOT be claimed by this field even when
    /// they would fuzzily match one of the synonyms.
    pub avoid: &'static [&'static str],
    pub required: bool,
}

/// Resolved field → zero-based column index.
pub type ColumnMap = HashMap<ImportField, usize>;

/// The fixed commission-import schema.
pub fn commission_import_schema() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec {
            field: ImportField::DevelopmentName,
            synonyms: &["EMPREENDIMENTO", "DEVELOPMENT"],
            avoid: &[],
            required: true,
        },
        ColumnSpec {
            field: ImportField::Block,
            synonyms: &["QUADRA", "BLOCO", "TORRE", "BLOCK"],
            avoid: &[],
            required: false,
        },
        ColumnSpec {
            field: ImportField::UnitNumber,
            synonyms: &["UNIDADE", "LOTE", "APTO", "UNIT"],
            avoid: &[],
            required: false,
        },
        ColumnSpec {
            field: ImportField::Floor,
            synonyms: &["ANDAR", "PAVIMENTO", "FLOOR"],
            avoid: &[],
            required: false,
        },
        ColumnSpec {
            field: ImportField::ClientName,
            synonyms: &["CLIENTE", "COMPRADOR", "CLIENT", "BUYER"],
            avoid: &[],
            required: false,
        },
        ColumnSpec {
            field: ImportField::SaleDate,
            synonyms: &["DATA DA VENDA", "DATA VENDA", "SALE DATE", "DATA", "DATE"],
            avoid: &[],
            required: true,
        },
        ColumnSpec {
            field: ImportField::TotalPrice,
            synonyms: &["VALOR TOTAL", "VALOR DA VENDA", "TOTAL PRICE", "PREÇO", "PRECO"],
            avoid: &["VALOR PARCELA", "VALOR BALÃO", "VALOR BALAO"],
            required: true,
        },
        ColumnSpec {
            field: ImportField::SignalAmount,
            synonyms: &["SINAL", "SIGNAL"],
            avoid: &[],
            required: false,
        },
        ColumnSpec {
            field: ImportField::InstallmentCount,
            synonyms: &["QTD PARCELAS", "PARCELAS", "INSTALLMENTS"],
            avoid: &["VALOR PARCELA", "VALOR PARCELAS", "INSTALLMENT VALUE"],
            required: false,
        },
        ColumnSpec {
            field: ImportField::InstallmentValue,
            synonyms: &[
                "VALOR PARCELA",
                "VALOR PARCELAS",
                "VALOR DA PARCELA",
                "INSTALLMENT VALUE",
            ],
            avoid: &["PARCELAS", "INSTALLMENTS"],
            required: false,
        },
        ColumnSpec {
            field: ImportField::BalloonCount,
            synonyms: &["QTD BALÕES", "QTD BALOES", "BALÕES", "BALOES", "BALLOONS"],
            avoid: &["VALOR BALÃO", "VALOR BALAO", "BALLOON VALUE"],
            required: false,
        },
        ColumnSpec {
            field: ImportField::BalloonValue,
            synonyms: &[
                "VALOR BALÃO",
                "VALOR BALAO",
                "VALOR DO BALÃO",
                "BALLOON VALUE",
            ],
            avoid: &["BALÕES", "BALOES", "BALLOONS"],
            required: false,
        },
        ColumnSpec {
            field: ImportField::BrokerName,
            synonyms: &["CORRETOR", "BROKER"],
            avoid: &[],
            required: true,
        },
    ]
}

/// Resolve each schema field to a column index.
///
/// Matching order per field: exact (case-insensitive) → prefix
/// (skipping headers equal to an avoided synonym) → substring in
/// either direction (skipping avoided headers, and refusing to let
/// a longer synonym claim a short header that an avoided synonym
/// also contains).
///
/// Returns the resolved map, or the list of missing required field
/// labels — a batch-level failure, checked before any row runs.
pub fn resolve_columns(
    headers: &[String],
    specs: &[ColumnSpec],
) -> Result<ColumnMap, Vec<String>> {
    let upper: Vec<String> = headers
        .iter()
        .map(|h| h.trim().to_uppercase())
        .collect();

    let mut map = ColumnMap::new();
    let mut missing = Vec::new();

    for spec in specs {
        match match_column(&upper, spec) {
            Some(idx) => {
                map.insert(spec.field, idx);
            }
            None if spec.required => missing.push(spec.field.to_string()),
            None => {}
        }
    }

    if missing.is_empty() {
        Ok(map)
    } else {
        Err(missing)
    }
}

fn match_column(headers: &[String], spec: &ColumnSpec) -> Option<usize> {
    let avoided = |h: &str| spec.avoid.iter().any(|a| *a == h);

    // Pass 1: exact match.
    for syn in spec.synonyms {
        if let Some(idx) = headers.iter().position(|h| h == syn) {
            return Some(idx);
        }
    }

    // Pass 2: prefix match, never claiming an avoided header.
    for syn in spec.synonyms {
        if let Some(idx) = headers
            .iter()
            .position(|h| !avoided(h) && h.starts_with(syn))
        {
            return Some(idx);
        }
    }

    // Pass 3: substring, either direction.
    for syn in spec.synonyms {
        if let Some(idx) = headers.iter().position(|h| {
            if h.is_empty() || avoided(h) {
                return false;
            }
            if h.contains(syn) {
                return true;
            }
            // Reverse direction: the header is shorter than the
            // synonym. Refuse when an avoided synonym also contains
            // the header, otherwise "VALOR PARCELAS" would swallow
            // a plain "PARCELAS" column.
            syn.contains(h.as_str()) && !spec.avoid.iter().any(|a| a.contains(h.as_str()))
        }) {
            return Some(idx);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let h = headers(&["Empreendimento", "Data da Venda", "Valor Total", "Corretor"]);
        let map = resolve_columns(&h, &commission_import_schema()).unwrap();
        assert_eq!(map[&ImportField::DevelopmentName], 0);
        assert_eq!(map[&ImportField::SaleDate], 1);
        assert_eq!(map[&ImportField::TotalPrice], 2);
        assert_eq!(map[&ImportField::BrokerName], 3);
    }

    #[test]
    fn test_installment_columns_disambiguated() {
        let h = headers(&[
            "EMPREENDIMENTO",
            "DATA",
            "VALOR TOTAL",
            "CORRETOR",
            "PARCELAS",
            "VALOR PARCELA",
        ]);
        let map = resolve_columns(&h, &commission_import_schema()).unwrap();
        assert_eq!(map[&ImportField::InstallmentCount], 4);
        assert_eq!(map[&ImportField::InstallmentValue], 5);
    }

    #[test]
    fn test_prefix_and_substring_fallback() {
        let h = headers(&[
            "EMPREENDIMENTO / OBRA",
            "DATA DA VENDA (DD/MM)",
            "VALOR TOTAL R$",
            "NOME DO CORRETOR",
        ]);
        let map = resolve_columns(&h, &commission_import_schema()).unwrap();
        assert_eq!(map[&ImportField::DevelopmentName], 0);
        assert_eq!(map[&ImportField::BrokerName], 3);
    }

    #[test]
    fn test_missing_required_columns_reported() {
        let h = headers(&["EMPREENDIMENTO", "DATA"]);
        let err = resolve_columns(&h, &commission_import_schema()).unwrap_err();
        assert!(err.contains(&"total price".to_string()));
        assert!(err.contains(&"broker name".to_string()));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let h = headers(&["EMPREENDIMENTO", "DATA", "VALOR TOTAL", "CORRETOR"]);
        let map = resolve_columns(&h, &commission_import_schema()).unwrap();
        assert!(!map.contains_key(&ImportField::BalloonCount));
        assert!(!map.contains_key(&ImportField::ClientName));
    }
}
