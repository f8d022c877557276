// src/db/schema.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::AppError;

/// Identificador validado de esquema de tenant.
///
/// O nome é gerado pelo servidor no provisionamento e NUNCA aceito de input
/// do usuário final. A validação garante que ele possa ser interpolado com
/// segurança nos dois únicos pontos onde um identificador entra no SQL:
/// `CREATE SCHEMA` e o `search_path` do provisionamento.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaName(String);

impl SchemaName {
    /// Valida um nome de esquema: `[a-z_][a-z0-9_]*`, no máximo 63 bytes
    /// (limite de identificador do Postgres).
    pub fn new(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        let mut chars = raw.chars();
        let valid_first = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if raw.is_empty() || raw.len() > 63 || !valid_first || !valid_rest {
            return Err(AppError::InvalidSchemaName(raw));
        }
        Ok(Self(raw))
    }

    /// Gera um nome novo a partir do nome do negócio, com sufixo aleatório
    /// para evitar colisão entre tenants de nome parecido.
    pub fn generate(business_name: &str) -> Self {
        let mut slug: String = business_name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        slug.truncate(20);
        let slug = slug.trim_matches('_');
        let base = if slug.is_empty() { "tenant" } else { slug };

        let suffix = &Uuid::new_v4().simple().to_string()[..6];
        // Identificador não pode começar com dígito ("7_eleven" é inválido)
        if base.starts_with(|c: char| c.is_ascii_digit()) {
            Self(format!("t_{}_{}", base, suffix))
        } else {
            Self(format!("{}_{}", base, suffix))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identificador entre aspas duplas, para os pontos de DDL.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl std::fmt::Display for SchemaName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SchemaName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SchemaName> for String {
    fn from(value: SchemaName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aceita_identificadores_validos() {
        assert!(SchemaName::new("mercado_central_a1b2c3").is_ok());
        assert!(SchemaName::new("_interno").is_ok());
        assert!(SchemaName::new("t9").is_ok());
    }

    #[test]
    fn rejeita_identificadores_perigosos() {
        assert!(SchemaName::new("").is_err());
        assert!(SchemaName::new("9comeca_com_digito").is_err());
        assert!(SchemaName::new("Maiusculas").is_err());
        assert!(SchemaName::new("com espaco").is_err());
        assert!(SchemaName::new("a\"; DROP SCHEMA public; --").is_err());
        assert!(SchemaName::new("a".repeat(64)).is_err());
    }

    #[test]
    fn generate_produz_nome_valido() {
        let schema = SchemaName::generate("Mama Njeri's Supermarket #2");
        assert!(SchemaName::new(schema.as_str().to_string()).is_ok());
        assert!(schema.as_str().starts_with("mama_njeri"));
    }

    #[test]
    fn generate_cobre_nome_comecando_com_digito() {
        let schema = SchemaName::generate("7-Eleven Mini Mart");
        assert!(schema.as_str().starts_with("t_7_eleven"));
        assert!(SchemaName::new(schema.as_str().to_string()).is_ok());
    }

    #[test]
    fn generate_cobre_nome_sem_caracteres_uteis() {
        let schema = SchemaName::generate("!!!");
        assert!(schema.as_str().starts_with("tenant_"));
        assert!(SchemaName::new(schema.as_str().to_string()).is_ok());
    }

    #[test]
    fn quoted_envolve_em_aspas_duplas() {
        let schema = SchemaName::new("duka_x").unwrap();
        assert_eq!(schema.quoted(), "\"duka_x\"");
    }
}
