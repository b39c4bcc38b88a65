//! # ceRNA Network Assembly
//!
//! Builds the undirected validated-triplet graph: nodes are the lncRNA and
//! mRNA identifiers appearing in any validated triplet, edges are distinct
//! (lncRNA, mRNA) pairs annotated with the mediating miRNA and classifier
//! score. When several miRNAs validate the same pair, the edge keeps the
//! mediator with the highest score; equal scores keep the first mediator in
//! the deterministic input order.
//!
//! Degree centrality (degree / (|V| − 1)) is attached to nodes as an
//! annotation pass after assembly; the edge set is never mutated by it.
//!
//! Exports cover the graph-interchange and tabular artifacts of a run:
//! GraphML, Cytoscape SIF, node and edge tables, and a degree-centrality
//! table sorted descending.

use crate::types::ValidatedTriplet;
use ahash::AHashMap;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::io::Write;

/// Node payload: gene name plus the post-assembly centrality annotation.
#[derive(Debug, Clone)]
pub struct NodeAttrs {
    pub name: String,
    pub centrality: f64,
}

/// Edge payload: the mediating miRNA and the classifier score of the
/// validated triplet that produced the edge.
#[derive(Debug, Clone)]
pub struct EdgeAttrs {
    pub mirna: String,
    pub score: f64,
}

/// The assembled ceRNA graph.
#[derive(Debug)]
pub struct CernaNetwork {
    graph: UnGraph<NodeAttrs, EdgeAttrs>,
}

/// Builds the network from the validated set and runs the centrality pass.
pub fn assemble(validated: &[ValidatedTriplet]) -> CernaNetwork {
    let mut graph: UnGraph<NodeAttrs, EdgeAttrs> = UnGraph::new_undirected();
    let mut nodes: AHashMap<String, NodeIndex> = AHashMap::new();
    let mut edges: AHashMap<(NodeIndex, NodeIndex), petgraph::graph::EdgeIndex> = AHashMap::new();

    let mut node_for = |graph: &mut UnGraph<NodeAttrs, EdgeAttrs>, name: &str| {
        if let Some(&index) = nodes.get(name) {
            return index;
        }
        let index = graph.add_node(NodeAttrs {
            name: name.to_string(),
            centrality: 0.0,
        });
        nodes.insert(name.to_string(), index);
        index
    };

    for triplet in validated {
        let lnc = node_for(&mut graph, &triplet.triplet.lncrna);
        let mrna = node_for(&mut graph, &triplet.triplet.mrna);
        let pair = if lnc <= mrna { (lnc, mrna) } else { (mrna, lnc) };

        match edges.get(&pair) {
            Some(&edge) => {
                // Collision: several mediators validated the same pair.
                // Highest score wins; ties keep the incumbent.
                let attrs = &mut graph[edge];
                if triplet.score > attrs.score {
                    attrs.mirna = triplet.triplet.mirna.clone();
                    attrs.score = triplet.score;
                }
            }
            None => {
                let edge = graph.add_edge(
                    lnc,
                    mrna,
                    EdgeAttrs {
                        mirna: triplet.triplet.mirna.clone(),
                        score: triplet.score,
                    },
                );
                edges.insert(pair, edge);
            }
        }
    }

    let mut network = CernaNetwork { graph };
    network.annotate_degree_centrality();
    log::info!(
        "assembled ceRNA network: {} nodes, {} edges",
        network.n_nodes(),
        network.n_edges()
    );
    network
}

impl CernaNetwork {
    pub fn n_nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn n_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Degree of every node, in node order.
    pub fn degrees(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .map(|n| self.graph.edges(n).count())
            .collect()
    }

    /// (name, centrality) for every node, in node order.
    pub fn centralities(&self) -> Vec<(&str, f64)> {
        self.graph
            .node_indices()
            .map(|n| {
                let attrs = &self.graph[n];
                (attrs.name.as_str(), attrs.centrality)
            })
            .collect()
    }

    /// (lncRNA-side name, mRNA-side name, mediator, score) for every edge.
    pub fn edge_list(&self) -> Vec<(&str, &str, &str, f64)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].name.as_str(),
                    self.graph[edge.target()].name.as_str(),
                    edge.weight().mirna.as_str(),
                    edge.weight().score,
                )
            })
            .collect()
    }

    fn annotate_degree_centrality(&mut self) {
        let n = self.graph.node_count();
        if n <= 1 {
            // A single node (or empty graph) has no possible neighbors.
            for node in self.graph.node_indices() {
                self.graph[node].centrality = 0.0;
            }
            return;
        }
        let scale = 1.0 / (n as f64 - 1.0);
        let degrees: Vec<(NodeIndex, usize)> = self
            .graph
            .node_indices()
            .map(|node| (node, self.graph.edges(node).count()))
            .collect();
        for (node, degree) in degrees {
            self.graph[node].centrality = degree as f64 * scale;
        }
    }

    /// Writes the graph in GraphML with name/centrality node attributes and
    /// miRNA/score edge attributes.
    pub fn write_graphml<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            writer,
            r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#
        )?;
        writeln!(
            writer,
            r#"  <key id="d0" for="node" attr.name="name" attr.type="string"/>"#
        )?;
        writeln!(
            writer,
            r#"  <key id="d1" for="node" attr.name="centrality" attr.type="double"/>"#
        )?;
        writeln!(
            writer,
            r#"  <key id="d2" for="edge" attr.name="miRNA" attr.type="string"/>"#
        )?;
        writeln!(
            writer,
            r#"  <key id="d3" for="edge" attr.name="score" attr.type="double"/>"#
        )?;
        writeln!(writer, r#"  <graph edgedefault="undirected">"#)?;
        for node in self.graph.node_indices() {
            let attrs = &self.graph[node];
            writeln!(writer, r#"    <node id="{}">"#, xml_escape(&attrs.name))?;
            writeln!(
                writer,
                r#"      <data key="d0">{}</data>"#,
                xml_escape(&attrs.name)
            )?;
            writeln!(writer, r#"      <data key="d1">{}</data>"#, attrs.centrality)?;
            writeln!(writer, r#"    </node>"#)?;
        }
        for edge in self.graph.edge_references() {
            writeln!(
                writer,
                r#"    <edge source="{}" target="{}">"#,
                xml_escape(&self.graph[edge.source()].name),
                xml_escape(&self.graph[edge.target()].name)
            )?;
            writeln!(
                writer,
                r#"      <data key="d2">{}</data>"#,
                xml_escape(&edge.weight().mirna)
            )?;
            writeln!(writer, r#"      <data key="d3">{}</data>"#, edge.weight().score)?;
            writeln!(writer, r#"    </edge>"#)?;
        }
        writeln!(writer, r#"  </graph>"#)?;
        writeln!(writer, r#"</graphml>"#)?;
        Ok(())
    }

    /// Writes the Cytoscape SIF representation, one `interacts` row per edge.
    pub fn write_sif<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for (source, target, _, _) in self.edge_list() {
            writeln!(writer, "{source} interacts {target}")?;
        }
        Ok(())
    }

    /// Writes the node table: gene, centrality.
    pub fn write_node_table<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["gene", "centrality"])?;
        for (name, centrality) in self.centralities() {
            out.write_record([name, &centrality.to_string()])?;
        }
        out.flush()?;
        Ok(())
    }

    /// Writes the edge table: source, target, miRNA, score.
    pub fn write_edge_table<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["source", "target", "miRNA", "score"])?;
        for (source, target, mirna, score) in self.edge_list() {
            out.write_record([source, target, mirna, &score.to_string()])?;
        }
        out.flush()?;
        Ok(())
    }

    /// Writes the degree-centrality table sorted descending (name ascending
    /// on ties, for stable output).
    pub fn write_centrality_table<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut rows = self.centralities();
        rows.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["gene", "degree_centrality"])?;
        for (name, centrality) in rows {
            out.write_record([name, &centrality.to_string()])?;
        }
        out.flush()?;
        Ok(())
    }
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
