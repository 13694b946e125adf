//! RDF vocabulary constants and well-known IRIs for twindb
//!
//! Centralizes the IRIs used throughout the twindb crates so that spelling
//! lives in exactly one place.
//!
//! # Organization
//!
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `xsd` - XSD datatype IRIs (http://www.w3.org/2001/XMLSchema#)
//! - `prefixes` - well-known prefix strings used by the query text parser

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI - links an entity to a class it instantiates
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// XSD datatype IRIs
///
/// These name the declared datatypes a `PropertyDef` can carry. References
/// to other entities use `ID_REF` rather than an XSD type.
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// IRI-reference pseudo-datatype (object is another entity)
    pub const ID_REF: &str = "@id";
}

/// Well-known prefixes recognized by the query text parser by default
pub mod prefixes {
    /// `rdf:` prefix expansion
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// `xsd:` prefix expansion
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdf_type_under_rdf_prefix() {
        assert!(rdf::TYPE.starts_with(prefixes::RDF));
    }

    #[test]
    fn test_xsd_iris_under_xsd_prefix() {
        for iri in [xsd::STRING, xsd::INTEGER, xsd::DOUBLE, xsd::BOOLEAN] {
            assert!(iri.starts_with(prefixes::XSD));
        }
    }
}
