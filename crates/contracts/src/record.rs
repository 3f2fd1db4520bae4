use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scalar cell values
// ---------------------------------------------------------------------------

/// One upstream field value. The legacy API is loose about types: the same
/// column can arrive as a bool, a number, a string, or null depending on the
/// record, so every field of [`NfeControleRecord`] is a `CellValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Anything non-scalar (objects, arrays). Never expected, but the upstream
    /// payload must not fail deserialization because of one odd record.
    Other(serde_json::Value),
}

/// Normalized interpretation of a flag column.
///
/// `Unknown` covers values outside both literal sets and is treated as false
/// everywhere a yes/no decision is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tristate {
    True,
    False,
    Unknown,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Display-string form, mirroring JavaScript `String(value)` semantics:
    /// integral numbers render without a fraction part, null renders empty.
    pub fn text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 9e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Other(v) => v.to_string(),
        }
    }

    /// Classifies a flag value against the literal sets the upstream emits.
    pub fn tristate(&self) -> Tristate {
        match self {
            CellValue::Bool(true) => Tristate::True,
            CellValue::Bool(false) => Tristate::False,
            CellValue::Null => Tristate::False,
            CellValue::Text(s) => match s.as_str() {
                "S" | "1" | "SIM" | "Sim" | "sim" => Tristate::True,
                "N" | "0" | "NAO" | "NÃO" | "Nao" | "não" | "" => Tristate::False,
                _ => Tristate::Unknown,
            },
            _ => Tristate::Unknown,
        }
    }

    pub fn is_truthy(&self) -> bool {
        self.tristate() == Tristate::True
    }

    /// Cell text shown in the table and in the PDF export.
    pub fn display(&self) -> String {
        match self {
            CellValue::Bool(b) => if *b { "Sim" } else { "Não" }.to_string(),
            CellValue::Text(s) if s == "S" => "Sim".to_string(),
            CellValue::Text(s) if s == "N" => "Não".to_string(),
            CellValue::Null => String::new(),
            other => other.text(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One fiscal-control row per operating unit/contact, as returned by the
/// `get_nfe_controle` upstream endpoint. Unknown extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NfeControleRecord {
    #[serde(default)]
    pub cod_unid_negoc: CellValue,
    #[serde(default)]
    pub cod_unid_oper: CellValue,
    #[serde(default)]
    pub nom_unid_oper: CellValue,
    #[serde(default)]
    pub nom_contato: CellValue,
    #[serde(default)]
    pub tem_certificado: CellValue,
    #[serde(default)]
    pub qr_code_homologacao: CellValue,
    #[serde(default)]
    pub qr_code_producao: CellValue,
    #[serde(default)]
    pub teste_cupom: CellValue,
    #[serde(default)]
    pub teste_nfse: CellValue,
}

impl NfeControleRecord {
    /// Uniqueness key: trimmed, case-sensitive concatenation of the four
    /// identity fields. Records sharing a key collapse to the first seen.
    pub fn dedupe_key(&self) -> String {
        [
            &self.cod_unid_negoc,
            &self.cod_unid_oper,
            &self.nom_unid_oper,
            &self.nom_contato,
        ]
        .iter()
        .map(|v| v.text().trim().to_string())
        .collect::<Vec<_>>()
        .join("|")
    }

    /// Field lookup by column key.
    pub fn field(&self, key: &str) -> &CellValue {
        match key {
            "cod_unid_negoc" => &self.cod_unid_negoc,
            "cod_unid_oper" => &self.cod_unid_oper,
            "nom_unid_oper" => &self.nom_unid_oper,
            "nom_contato" => &self.nom_contato,
            "tem_certificado" => &self.tem_certificado,
            "qr_code_homologacao" => &self.qr_code_homologacao,
            "qr_code_producao" => &self.qr_code_producao,
            "teste_cupom" => &self.teste_cupom,
            "teste_nfse" => &self.teste_nfse,
            _ => {
                static NULL: CellValue = CellValue::Null;
                &NULL
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Column metadata
// ---------------------------------------------------------------------------

/// Table/PDF column: upstream field key, visible label, whether the cell
/// content is centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub centered: bool,
}

pub const COLUMNS: [Column; 9] = [
    Column { key: "cod_unid_negoc", label: "Unid. Neg.", centered: true },
    Column { key: "cod_unid_oper", label: "Unid. Oper.", centered: true },
    Column { key: "nom_unid_oper", label: "Unidade", centered: false },
    Column { key: "nom_contato", label: "Contato", centered: false },
    Column { key: "tem_certificado", label: "Certificado", centered: true },
    Column { key: "qr_code_homologacao", label: "QRC Homologação", centered: true },
    Column { key: "qr_code_producao", label: "QRC Produção", centered: true },
    Column { key: "teste_cupom", label: "Teste | Cupom", centered: true },
    Column { key: "teste_nfse", label: "Teste | NFe", centered: true },
];
