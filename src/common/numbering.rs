// src/common/numbering.rs

use chrono::Utc;
use uuid::Uuid;

/// Gera um número de documento humano-legível (recibo de venda, fatura de
/// compra): prefixo fixo + últimos 8 dígitos do timestamp em milissegundos
/// + 4 caracteres hexadecimais aleatórios, tudo em maiúsculas.
///
/// A unicidade real é garantida pela constraint UNIQUE da coluna; não há
/// retry em caso de colisão: uma colisão aborta a transação com erro de
/// constraint (decisão registrada em DESIGN.md).
pub fn generate_document_no(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let tail = millis.rem_euclid(100_000_000);
    let entropy = Uuid::new_v4().simple().to_string();
    format!("{}{:08}{}", prefix, tail, &entropy[..4]).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formato_do_numero() {
        let receipt = generate_document_no("RCP");
        assert!(receipt.starts_with("RCP"));
        // prefixo (3) + 8 dígitos + 4 hex
        assert_eq!(receipt.len(), 15);
        assert_eq!(receipt, receipt.to_uppercase());

        let digits = &receipt[3..11];
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        let suffix = &receipt[11..];
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn prefixos_diferentes_para_venda_e_compra() {
        assert!(generate_document_no("RCP").starts_with("RCP"));
        assert!(generate_document_no("INV").starts_with("INV"));
    }
}
