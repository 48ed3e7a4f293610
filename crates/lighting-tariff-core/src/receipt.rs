//! Receipt numbering and rendering for public-lighting charges.
//!
//! Rendering is plain string formatting over already-computed totals; no
//! tariff arithmetic happens here beyond summing the four components.
//! Optional metadata that is empty is treated as absent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checked;
use crate::tables::METHODOLOGY;
use crate::types::{money, Money};
use crate::TariffResult;

const RECEIPT_FRAGMENT_LEN: usize = 10;
const EMPTY_FRAGMENT: &str = "MUNICIPIO";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One concept line of a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub concept: String,
    pub value: Money,
}

/// Receipt summary embedded in every calculation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub receipt_number: String,
    pub municipality: String,
    pub period: String,
    pub methodology: String,
    pub lines: Vec<ReceiptLine>,
    pub total: Money,
}

/// The four CAP components a receipt is rendered from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptComponents {
    pub csee: Money,
    pub cinv: Money,
    pub caom: Money,
    pub cotr: Money,
}

/// Who issues the receipt and where its figures came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptMetadata {
    pub issuing_entity: String,
    pub data_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A rendered receipt in plain text and Markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptResult {
    pub receipt_number: String,
    pub tenant_id: String,
    pub methodology: String,
    pub municipality: String,
    pub period: String,
    pub issuing_entity: String,
    pub data_source: String,
    pub components: ReceiptComponents,
    pub total: Money,
    pub text_content: String,
    pub markdown_content: String,
}

/// Everything needed to render a receipt without running a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptTemplate {
    pub municipality: String,
    pub period: String,
    #[serde(default = "default_methodology")]
    pub methodology: String,
    pub components: ReceiptComponents,
    pub metadata: ReceiptMetadata,
}

fn default_methodology() -> String {
    METHODOLOGY.to_string()
}

// ---------------------------------------------------------------------------
// Receipt number
// ---------------------------------------------------------------------------

/// Strip everything but ASCII letters and digits, upper-case, keep ten chars.
fn sanitize_fragment(value: &str) -> String {
    let fragment: String = value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(RECEIPT_FRAGMENT_LEN)
        .collect();
    if fragment.is_empty() {
        EMPTY_FRAGMENT.to_string()
    } else {
        fragment
    }
}

/// Deterministic receipt number: `REC-{MUNICIPALITY}-{PERIOD}`.
pub fn receipt_number(municipality: &str, period: &str) -> String {
    format!(
        "REC-{}-{}",
        sanitize_fragment(municipality),
        sanitize_fragment(period)
    )
}

/// Summary attached to a calculation result. Totals arrive at full precision.
pub fn receipt_summary(
    municipality: &str,
    period: &str,
    components: &ReceiptComponents,
    cap_total: Money,
) -> ReceiptSummary {
    ReceiptSummary {
        receipt_number: receipt_number(municipality, period),
        municipality: municipality.to_string(),
        period: period.to_string(),
        methodology: METHODOLOGY.to_string(),
        lines: component_lines(components)
            .into_iter()
            .map(|(concept, value)| ReceiptLine {
                concept: concept.to_string(),
                value: money(value),
            })
            .collect(),
        total: money(cap_total),
    }
}

fn component_lines(components: &ReceiptComponents) -> [(&'static str, Money); 4] {
    [
        ("CSEE", components.csee),
        ("CINV", components.cinv),
        ("CAOM", components.caom),
        ("COTR", components.cotr),
    ]
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a simple receipt from four component totals.
///
/// The total is the money-rounded sum of the components as given.
pub fn render_receipt(
    components: &ReceiptComponents,
    metadata: &ReceiptMetadata,
    municipality: &str,
    period: &str,
    methodology: &str,
    tenant_id: &str,
) -> TariffResult<ReceiptResult> {
    let total = money(checked::sum(
        component_lines(components).map(|(_, value)| value),
        "receipt.total",
    )?);
    let number = receipt_number(municipality, period);
    let header = ReceiptHeader {
        number: &number,
        tenant_id,
        municipality,
        period,
        methodology,
        metadata,
    };

    Ok(ReceiptResult {
        text_content: render_text(&header, components, total),
        markdown_content: render_markdown(&header, components, total),
        receipt_number: number.clone(),
        tenant_id: tenant_id.to_string(),
        methodology: methodology.to_string(),
        municipality: municipality.to_string(),
        period: period.to_string(),
        issuing_entity: metadata.issuing_entity.clone(),
        data_source: metadata.data_source.clone(),
        components: ReceiptComponents {
            csee: money(components.csee),
            cinv: money(components.cinv),
            caom: money(components.caom),
            cotr: money(components.cotr),
        },
        total,
    })
}

/// Render a receipt from a filled-in template.
pub fn render_template(
    template: &ReceiptTemplate,
    tenant_id: &str,
) -> TariffResult<ReceiptResult> {
    render_receipt(
        &template.components,
        &template.metadata,
        &template.municipality,
        &template.period,
        &template.methodology,
        tenant_id,
    )
}

/// Blank template handed to clients that fill receipts in by hand.
pub fn receipt_template() -> ReceiptTemplate {
    ReceiptTemplate {
        municipality: "Nombre del municipio".into(),
        period: "2026-01".into(),
        methodology: METHODOLOGY.to_string(),
        components: ReceiptComponents::default(),
        metadata: ReceiptMetadata {
            issuing_entity: "Cunservicios".into(),
            data_source: "plantilla_manual_v1".into(),
            tax_id: Some("900000000-0".into()),
            address: Some("Dirección".into()),
            contact: Some("correo@empresa.com".into()),
            notes: Some("Opcional".into()),
        },
    }
}

struct ReceiptHeader<'a> {
    number: &'a str,
    tenant_id: &'a str,
    municipality: &'a str,
    period: &'a str,
    methodology: &'a str,
    metadata: &'a ReceiptMetadata,
}

fn render_text(header: &ReceiptHeader<'_>, components: &ReceiptComponents, total: Money) -> String {
    let metadata = header.metadata;
    let mut lines = vec![
        "RECIBO SIMPLE - ALUMBRADO PUBLICO".to_string(),
        format!("Numero: {}", header.number),
        format!("Tenant: {}", header.tenant_id),
        format!("Municipio: {}", header.municipality),
        format!("Periodo: {}", header.period),
        format!("Metodologia: {}", header.methodology),
        format!("Entidad facturadora: {}", metadata.issuing_entity),
        format!("Fuente de datos: {}", metadata.data_source),
        String::new(),
    ];
    for (concept, value) in component_lines(components) {
        lines.push(format!("{concept}: {}", format_money(value)));
    }
    lines.push(format!("TOTAL CAP: {}", format_money(total)));

    // Fixed slots 7, 8 and 9: with only some of them present, address or
    // contact can land after the data-source line.
    if let Some(tax_id) = present(&metadata.tax_id) {
        lines.insert(7, format!("NIT: {tax_id}"));
    }
    if let Some(address) = present(&metadata.address) {
        lines.insert(8, format!("Direccion: {address}"));
    }
    if let Some(contact) = present(&metadata.contact) {
        lines.insert(9, format!("Contacto: {contact}"));
    }

    if let Some(notes) = present(&metadata.notes) {
        lines.push(String::new());
        lines.push(format!("Observaciones: {notes}"));
    }

    lines.join("\n")
}

fn render_markdown(
    header: &ReceiptHeader<'_>,
    components: &ReceiptComponents,
    total: Money,
) -> String {
    let metadata = header.metadata;
    let mut out = String::from("# Recibo simple de alumbrado público\n\n");
    out.push_str(&format!("- **Número:** {}\n", header.number));
    out.push_str(&format!("- **Tenant:** {}\n", header.tenant_id));
    out.push_str(&format!("- **Municipio:** {}\n", header.municipality));
    out.push_str(&format!("- **Período:** {}\n", header.period));
    out.push_str(&format!("- **Metodología:** {}\n", header.methodology));
    out.push_str(&format!(
        "- **Entidad facturadora:** {}\n",
        metadata.issuing_entity
    ));
    out.push_str(&format!("- **Fuente de datos:** {}\n", metadata.data_source));
    if let Some(tax_id) = present(&metadata.tax_id) {
        out.push_str(&format!("- **NIT:** {tax_id}\n"));
    }
    if let Some(address) = present(&metadata.address) {
        out.push_str(&format!("- **Dirección:** {address}\n"));
    }
    if let Some(contact) = present(&metadata.contact) {
        out.push_str(&format!("- **Contacto:** {contact}\n"));
    }

    out.push_str("\n## Componentes CAP\n\n");
    out.push_str("| Concepto | Valor |\n");
    out.push_str("|---|---:|\n");
    for (concept, value) in component_lines(components) {
        out.push_str(&format!("| {concept} | {} |\n", format_money(value)));
    }
    out.push_str(&format!(
        "| **TOTAL CAP** | **{}** |\n",
        format_money(total)
    ));

    if let Some(notes) = present(&metadata.notes) {
        out.push_str(&format!("\n**Observaciones:** {notes}\n"));
    }

    out
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// `$1,234.56`, sign after the currency symbol for negatives.
fn format_money(value: Decimal) -> String {
    let mut rounded = money(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded = rounded.abs();
    rounded.rescale(2);

    let text = rounded.to_string();
    let (units, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("${sign}{grouped}.{cents}")
}
