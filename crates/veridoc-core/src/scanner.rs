//! Barcode scanning via rxing.

use std::path::Path;

use crate::provider::{BarcodeProvider, BarcodeSymbol, ProviderError, SymbolKind};

/// rxing-backed implementation of [`BarcodeProvider`].
#[derive(Default)]
pub struct RxingBarcodeProvider;

impl RxingBarcodeProvider {
    pub fn new() -> Self {
        Self
    }
}

fn symbol_kind(format: &rxing::BarcodeFormat) -> SymbolKind {
    match format {
        rxing::BarcodeFormat::PDF_417 => SymbolKind::Pdf417,
        rxing::BarcodeFormat::QR_CODE => SymbolKind::QrCode,
        rxing::BarcodeFormat::CODE_128 => SymbolKind::Code128,
        _ => SymbolKind::Other,
    }
}

impl BarcodeProvider for RxingBarcodeProvider {
    fn scan(&mut self, path: &Path) -> Result<Vec<BarcodeSymbol>, ProviderError> {
        let results = match rxing::helpers::detect_multiple_in_file(&path.to_string_lossy()) {
            Ok(results) => results,
            // An image with no decodable symbol is a domain outcome, not a
            // provider fault.
            Err(rxing::Exceptions::NotFoundException(_)) => Vec::new(),
            Err(e) => return Err(ProviderError::ScanFailed(e.to_string())),
        };

        tracing::debug!(path = %path.display(), symbols = results.len(), "barcode scan complete");
        Ok(results
            .into_iter()
            .map(|result| BarcodeSymbol {
                kind: symbol_kind(result.getBarcodeFormat()),
                payload: result.getText().as_bytes().to_vec(),
            })
            .collect())
    }
}
