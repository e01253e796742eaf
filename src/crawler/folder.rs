//! Digital folder payload
//!
//! The folder page embeds its document tree as a JSON array. Only the title,
//! the download parameters and the children drive the crawl; every other
//! field the portal sends is loosely typed (often `null`) and kept optional.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the digital folder tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigitalFolderNode {
    #[serde(default)]
    pub data: NodeData,

    #[serde(default)]
    pub children: Vec<DigitalFolderNode>,
}

/// Payload of a folder node
///
/// Top-level nodes describe a movement ("Petição", "Certidão de Publicação").
/// Their children are page ranges carrying the `parametros` query string the
/// PDF endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub title: String,

    /// Opaque query string for `getPDF.do`
    #[serde(default)]
    pub parametros: Option<String>,

    // Fields below are informational only. The portal is loose about their
    // types, so they are kept as raw JSON and never fail a folder load.
    #[serde(default)]
    pub cd_documento: Option<Value>,

    #[serde(default)]
    pub dt_inclusao: Option<Value>,

    #[serde(default)]
    pub cd_tipo_doc_digital: Option<Value>,

    #[serde(default)]
    pub nu_paginas: Option<Value>,

    #[serde(default)]
    pub indice_pagina: Option<Value>,

    #[serde(default)]
    pub fl_peticao_inicial: Option<Value>,

    #[serde(default)]
    pub documento_sigiloso: Option<Value>,

    #[serde(default)]
    pub fl_assinado: Option<Value>,
}

impl DigitalFolderNode {
    pub fn title(&self) -> &str {
        &self.data.title
    }

    /// Download parameters, when this node points at an actual document
    pub fn download_parameters(&self) -> Option<&str> {
        self.data
            .parametros
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn is_document(&self) -> bool {
        self.download_parameters().is_some()
    }

    /// Document-bearing nodes of this subtree in pre-order, self included
    pub fn documents(&self) -> Vec<&DigitalFolderNode> {
        let mut out = Vec::new();
        collect_documents(self, &mut out);
        out
    }
}

fn collect_documents<'a>(node: &'a DigitalFolderNode, out: &mut Vec<&'a DigitalFolderNode>) {
    if node.is_document() {
        out.push(node);
    }
    for child in &node.children {
        collect_documents(child, out);
    }
}

/// Movement titles whose documents are worth downloading
///
/// Comparison trims and lowercases both sides, so configured entries may use
/// any casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusAllowList {
    statuses: Vec<String>,
}

impl StatusAllowList {
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            statuses: statuses
                .into_iter()
                .map(|s| normalize_title(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn allows(&self, title: &str) -> bool {
        let title = normalize_title(title);
        self.statuses.iter().any(|status| *status == title)
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Picks the documents to download, in tree order
    ///
    /// An allowed node contributes every document in its subtree. Nodes that
    /// are not allowed are searched for allowed descendants.
    pub fn select<'a>(&self, nodes: &'a [DigitalFolderNode]) -> Vec<&'a DigitalFolderNode> {
        let mut out = Vec::new();
        for node in nodes {
            if self.allows(node.title()) {
                out.extend(node.documents());
            } else {
                out.extend(self.select(&node.children));
            }
        }
        out
    }
}

impl Default for StatusAllowList {
    /// Statuses that carry deadline information
    fn default() -> Self {
        Self::new(["certidão de publicação"])
    }
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(title: &str, parametros: &str) -> DigitalFolderNode {
        DigitalFolderNode {
            data: NodeData {
                title: title.to_string(),
                parametros: Some(parametros.to_string()),
                ..Default::default()
            },
            children: vec![],
        }
    }

    fn movement(title: &str, children: Vec<DigitalFolderNode>) -> DigitalFolderNode {
        DigitalFolderNode {
            data: NodeData {
                title: title.to_string(),
                ..Default::default()
            },
            children,
        }
    }

    #[test]
    fn test_deserialize_portal_payload() {
        let json = r#"[{
            "data": {
                "cdProcessoMaster": null,
                "cdDocumento": "294392168",
                "dtInclusao": "24/01/2024 16:19:49",
                "icon": false,
                "title": "Petição (Outras)",
                "cdTipoDocDigital": "9500",
                "flPeticaoInicial": true,
                "cdFormatoDoc": 9,
                "deSituacaoProcesso": null
            },
            "children": [{
                "data": {
                    "nuPaginas": 16,
                    "id_paginacao": 0,
                    "iconesAss": [{"imagem": "logo_cliente.png", "alt": "assinado.PNG"}],
                    "indicePagina": 1,
                    "title": "Páginas 1 - 16",
                    "parametros": "nuSeqRecurso=00000&cdDocumento=294392168",
                    "contexto": [],
                    "tramitacao": null,
                    "flAssinado": true
                },
                "id_paginacao": 0,
                "attributes": {"id": "294392168-1-1"}
            }]
        }]"#;

        let nodes: Vec<DigitalFolderNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].title(), "Petição (Outras)");
        assert_eq!(nodes[0].data.cd_documento, Some(Value::from("294392168")));
        assert_eq!(nodes[0].data.fl_peticao_inicial, Some(Value::Bool(true)));
        assert!(!nodes[0].is_document());

        let page = &nodes[0].children[0];
        assert_eq!(page.title(), "Páginas 1 - 16");
        assert_eq!(page.data.nu_paginas, Some(Value::from(16)));
        assert_eq!(
            page.download_parameters(),
            Some("nuSeqRecurso=00000&cdDocumento=294392168")
        );
    }

    #[test]
    fn test_informational_fields_tolerate_type_drift() {
        let json = r#"[{
            "data": {
                "title": "Certidão de Publicação",
                "cdDocumento": 294392168,
                "nuPaginas": "16",
                "flAssinado": "S",
                "flPeticaoInicial": null,
                "documentoSigiloso": {"motivo": null}
            },
            "children": [{"data": {"title": "Páginas 1 - 1", "parametros": "a=1", "indicePagina": "1"}}]
        }]"#;

        let nodes: Vec<DigitalFolderNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes[0].data.cd_documento, Some(Value::from(294392168)));
        assert_eq!(nodes[0].data.nu_paginas, Some(Value::from("16")));
        assert_eq!(nodes[0].children[0].download_parameters(), Some("a=1"));
    }

    #[test]
    fn test_allow_list_is_case_insensitive() {
        let allow = StatusAllowList::default();
        assert!(allow.allows("Certidão de Publicação"));
        assert!(allow.allows("  CERTIDÃO DE PUBLICAÇÃO "));
        assert!(!allow.allows("Petição (Outras)"));
    }

    #[test]
    fn test_allow_list_ignores_blank_entries() {
        let allow = StatusAllowList::new(["", "  "]);
        assert!(allow.is_empty());
        assert!(!allow.allows(""));
    }

    #[test]
    fn test_select_keeps_tree_order() {
        let tree = vec![
            movement("Petição (Outras)", vec![leaf("Páginas 1 - 16", "a=1")]),
            movement(
                "Certidão de Publicação",
                vec![leaf("Páginas 17 - 17", "a=2"), leaf("Páginas 18 - 18", "a=3")],
            ),
            movement("Decisão", vec![leaf("Páginas 19 - 20", "a=4")]),
            movement("Certidão de Publicação", vec![leaf("Páginas 21 - 21", "a=5")]),
        ];

        let selected: Vec<_> = StatusAllowList::default()
            .select(&tree)
            .into_iter()
            .filter_map(|n| n.download_parameters())
            .collect();
        assert_eq!(selected, vec!["a=2", "a=3", "a=5"]);
    }

    #[test]
    fn test_select_finds_nested_status() {
        let tree = vec![movement(
            "Apenso",
            vec![movement(
                "Certidão de Publicação",
                vec![leaf("Páginas 1 - 1", "x=1")],
            )],
        )];
        let selected = StatusAllowList::default().select(&tree);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].title(), "Páginas 1 - 1");
    }

    #[test]
    fn test_blank_parameters_are_not_documents() {
        let node = leaf("Páginas 1 - 1", "   ");
        assert!(!node.is_document());
        assert!(node.documents().is_empty());
    }
}
