//! Receipts (boletas) issued by the backend and the statistics derived from
//! them.

use core::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use hazellab_core::{ReceiptId, contains_ci};
use hazellab_products::Product;

use crate::totals::UnknownCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiptStatus {
    #[serde(rename = "PAGADA")]
    Paid,
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "ANULADA")]
    Voided,
}

impl ReceiptStatus {
    pub const ALL: [ReceiptStatus; 3] = [
        ReceiptStatus::Paid,
        ReceiptStatus::Pending,
        ReceiptStatus::Voided,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ReceiptStatus::Paid => "PAGADA",
            ReceiptStatus::Pending => "PENDIENTE",
            ReceiptStatus::Voided => "ANULADA",
        }
    }
}

impl FromStr for ReceiptStatus {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCode(s.to_string()))
    }
}

impl core::fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Unknown or missing statuses become `None` instead of failing the whole
/// listing.
fn lenient_status<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ReceiptStatus>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.and_then(|raw| raw.parse().ok()))
}

/// One receipt line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    #[serde(default)]
    pub producto: Option<Product>,
    #[serde(default)]
    pub cantidad: Option<u32>,
    #[serde(default)]
    pub precio_unitario: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

impl ReceiptLine {
    /// Line total as sent, else unit price × quantity.
    pub fn amount(&self) -> f64 {
        self.total.unwrap_or_else(|| {
            self.precio_unitario.unwrap_or(0.0) * f64::from(self.cantidad.unwrap_or(1))
        })
    }
}

/// A receipt (`/boletas`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(default)]
    pub id: Option<ReceiptId>,
    #[serde(default)]
    pub numero_boleta: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub estado: Option<ReceiptStatus>,
    #[serde(default)]
    pub fecha_emision: Option<String>,
    #[serde(default)]
    pub metodo_pago: Option<String>,
    #[serde(default)]
    pub metodo_envio: Option<String>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub iva: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub detalles: Vec<ReceiptLine>,
}

impl Receipt {
    pub fn total(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }

    pub fn is_paid(&self) -> bool {
        self.estado == Some(ReceiptStatus::Paid)
    }

    /// Issue timestamp, accepting ISO date-times with or without fraction.
    pub fn issued_at(&self) -> Option<NaiveDateTime> {
        let raw = self.fecha_emision.as_deref()?.trim();
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }

    pub fn units(&self) -> u32 {
        self.detalles.iter().map(|d| d.cantidad.unwrap_or(1)).sum()
    }
}

/// Admin receipts table filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptFilter {
    /// `None` shows every status.
    pub status: Option<ReceiptStatus>,
    /// Matched against the receipt number and the payment/shipping codes.
    pub search: String,
}

impl ReceiptFilter {
    pub fn matches(&self, receipt: &Receipt) -> bool {
        if self.status.is_some_and(|s| receipt.estado != Some(s)) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || contains_ci(receipt.numero_boleta.as_deref(), &needle)
            || contains_ci(receipt.metodo_pago.as_deref(), &needle)
            || contains_ci(receipt.metodo_envio.as_deref(), &needle)
    }

    pub fn apply(&self, receipts: &[Receipt]) -> Vec<Receipt> {
        receipts.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// `PUT /boletas/{id}/estado` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub estado: ReceiptStatus,
}

/// Sales summary for the admin sales page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStats {
    pub total_ventas: usize,
    pub ventas_pagadas: usize,
    pub ventas_pendientes: usize,
    pub ingresos_totales: f64,
    pub promedio_venta: f64,
}

impl SalesStats {
    /// Revenue sums every receipt's total (missing totals count as 0),
    /// whatever its status.
    pub fn from_receipts(receipts: &[Receipt]) -> Self {
        let count = |status| receipts.iter().filter(|r| r.estado == Some(status)).count();
        let total_ventas = receipts.len();
        let ingresos_totales: f64 = receipts.iter().map(Receipt::total).sum();
        let promedio_venta = if total_ventas > 0 {
            ingresos_totales / total_ventas as f64
        } else {
            0.0
        };

        Self {
            total_ventas,
            ventas_pagadas: receipts.iter().filter(|r| r.is_paid()).count(),
            ventas_pendientes: count(ReceiptStatus::Pending),
            ingresos_totales,
            promedio_venta,
        }
    }
}

/// Entry of `GET /dashboard/productos-mas-vendidos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub total_vendidos: Option<u64>,
}
