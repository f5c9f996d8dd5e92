use lazy_static::lazy_static;
use regex::Regex;

use crate::tree::{NodeId, PhyloTree};

lazy_static! {
    static ref ILLEGAL_CHARS: Regex = Regex::new(r"[:;(),\[\]\t\n\r=]").unwrap();
}

/// Newick flavours, numbered by their usual format codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewickFormat {
    /// 0: leaf names and distances, internal support values and distances
    Support,
    /// 1: leaf and internal names with distances
    InternalNames,
    /// 8: leaf and internal names, no distances
    AllNames,
    /// 9: leaf names only
    LeafNames,
}

impl NewickFormat {
    pub fn code(&self) -> u8 {
        match self {
            NewickFormat::Support => 0,
            NewickFormat::InternalNames => 1,
            NewickFormat::AllNames => 8,
            NewickFormat::LeafNames => 9,
        }
    }
}

impl TryFrom<u8> for NewickFormat {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(NewickFormat::Support),
            1 => Ok(NewickFormat::InternalNames),
            8 => Ok(NewickFormat::AllNames),
            9 => Ok(NewickFormat::LeafNames),
            _ => Err(format!("Unsupported newick format {}", code)),
        }
    }
}

impl PhyloTree {
    /// Serialize the tree.
    ///
    /// `features` selects the NHX annotations: `None` writes none, an empty slice writes every
    /// feature a node carries and a non-empty slice writes the listed ones a node carries.
    pub fn write(&self, format: NewickFormat, features: Option<&[&str]>) -> String {
        let mut out = String::new();
        self.write_node(self.root(), format, features, &mut out);
        out.push(';');
        out
    }

    fn write_node(
        &self,
        id: NodeId,
        format: NewickFormat,
        features: Option<&[&str]>,
        out: &mut String,
    ) {
        let is_root = self.parent(id).is_none();

        if self.is_leaf(id) {
            out.push_str(&sanitize(self.name(id)));
            if !is_root {
                self.write_dist(id, format, out);
            }
            self.write_features(id, features, out);
            return;
        }

        out.push('(');
        for (i, &child) in self.children(id).iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.write_node(child, format, features, out);
        }
        out.push(')');

        if is_root {
            return;
        }

        let node = self.node(id);
        match format {
            NewickFormat::Support => out.push_str(&format_float(node.support)),
            NewickFormat::InternalNames | NewickFormat::AllNames => {
                out.push_str(&sanitize(&node.name))
            }
            NewickFormat::LeafNames => {}
        }
        self.write_dist(id, format, out);
        self.write_features(id, features, out);
    }

    fn write_dist(&self, id: NodeId, format: NewickFormat, out: &mut String) {
        if matches!(format, NewickFormat::Support | NewickFormat::InternalNames) {
            out.push(':');
            out.push_str(&format_float(self.node(id).dist));
        }
    }

    fn write_features(&self, id: NodeId, features: Option<&[&str]>, out: &mut String) {
        let features = match features {
            Some(f) => f,
            None => return,
        };

        let pairs: Vec<String> = if features.is_empty() {
            self.features(id)
                .iter()
                .map(|(k, v)| format!("{}={}", k, sanitize(v)))
                .collect()
        } else {
            features
                .iter()
                .filter_map(|&k| self.feature(id, k).map(|v| format!("{}={}", k, sanitize(&v))))
                .collect()
        };

        if !pairs.is_empty() {
            out.push_str("[&&NHX:");
            out.push_str(&pairs.join(":"));
            out.push(']');
        }
    }
}

fn sanitize(value: &str) -> String {
    ILLEGAL_CHARS.replace_all(value, "_").into_owned()
}

/// Format a float like C's `%0.6g`
pub(crate) fn format_float(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // Let the scientific formatter do the rounding so the exponent reflects it
    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if !(-4..6).contains(&exponent) {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
    } else {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value))
    }
}

fn trim_fraction(number: &str) -> String {
    if number.contains('.') {
        number
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        number.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ((A,B)AB,C) with a few features
    fn sample() -> PhyloTree {
        let mut tree = PhyloTree::with_root_name("root");
        let root = tree.root();
        let ab = tree.add_child(root, "AB");
        let a = tree.add_child(ab, "A");
        let b = tree.add_child(ab, "B");
        let c = tree.add_child(root, "C");

        tree.node_mut(ab).support = 0.95;
        tree.node_mut(a).dist = 0.25;
        tree.set_feature(a, "taxid", 9606);
        tree.set_feature(a, "sci_name", "Homo sapiens");
        tree.set_feature(c, "taxid", 10090);
        tree
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(0.123456789), "0.123457");
        assert_eq!(format_float(123456.0), "123456");
        assert_eq!(format_float(1234567.0), "1.23457e+06");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(9.9999996), "10");
        assert_eq!(format_float(0.0), "0");
    }

    #[test]
    fn test_write_leaf_names() {
        assert_eq!(sample().write(NewickFormat::LeafNames, None), "((A,B),C);");
    }

    #[test]
    fn test_write_all_names() {
        assert_eq!(sample().write(NewickFormat::AllNames, None), "((A,B)AB,C);");
    }

    #[test]
    fn test_write_support_and_distances() {
        assert_eq!(
            sample().write(NewickFormat::Support, None),
            "((A:0.25,B:1)0.95:1,C:1);"
        );
        assert_eq!(
            sample().write(NewickFormat::InternalNames, None),
            "((A:0.25,B:1)AB:1,C:1);"
        );
    }

    #[test]
    fn test_write_selected_features() {
        let got = sample().write(NewickFormat::LeafNames, Some(&["taxid", "sci_name", "missing"][..]));

        assert_eq!(
            got,
            "((A[&&NHX:taxid=9606:sci_name=Homo sapiens],B),C[&&NHX:taxid=10090]);"
        );
    }

    #[test]
    fn test_write_all_features() {
        let got = sample().write(NewickFormat::LeafNames, Some(&[][..]));

        assert_eq!(
            got,
            "((A[&&NHX:sci_name=Homo sapiens:taxid=9606],B),C[&&NHX:taxid=10090]);"
        );
    }

    #[test]
    fn test_write_sanitizes_names_and_values() {
        let mut tree = PhyloTree::new();
        let root = tree.root();
        let leaf = tree.add_child(root, "odd:name(1)");
        tree.add_child(root, "plain");
        tree.set_feature(leaf, "track", "a=b;c");

        assert_eq!(
            tree.write(NewickFormat::LeafNames, Some(&["track"][..])),
            "(odd_name_1_[&&NHX:track=a_b_c],plain);"
        );
    }

    #[test]
    fn test_format_codes() {
        for code in [0u8, 1, 8, 9] {
            assert_eq!(NewickFormat::try_from(code).unwrap().code(), code);
        }
        assert!(NewickFormat::try_from(5).is_err());
    }
}
