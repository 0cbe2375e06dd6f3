use crate::errors::{QlockError, Result};

#[derive(Debug, Clone)]
pub struct Cluster {
    nodes: Vec<String>,
    rpc_path: String,
}

impl Cluster {
    pub fn new(
        nodes: impl IntoIterator<Item = impl Into<String>>,
        rpc_path: impl Into<String>,
    ) -> Result<Self> {
        let nodes = nodes
            .into_iter()
            .map(|node| normalize_endpoint(&node.into()))
            .filter(|node| !node.is_empty())
            .collect::<Vec<_>>();

        if nodes.is_empty() {
            return Err(QlockError::EmptyCluster);
        }

        Ok(Self {
            nodes,
            rpc_path: rpc_path.into(),
        })
    }

    pub fn n(&self) -> usize {
        self.nodes.len()
    }

    pub fn quorum(&self) -> usize {
        self.nodes.len() / 2 + 1
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn endpoint(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(String::as_str)
    }

    pub fn rpc_path(&self) -> &str {
        &self.rpc_path
    }
}

pub fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::Cluster;

    #[test]
    fn quorum_is_majority() {
        let quorum_of = |n: usize| {
            let nodes = (0..n).map(|i| format!("10.0.0.{i}:9320"));
            Cluster::new(nodes, "/qlock").unwrap().quorum()
        };

        assert_eq!(quorum_of(1), 1);
        assert_eq!(quorum_of(2), 2);
        assert_eq!(quorum_of(3), 2);
        assert_eq!(quorum_of(4), 3);
        assert_eq!(quorum_of(5), 3);
    }

    #[test]
    fn empty_cluster_is_rejected() {
        let nodes: Vec<String> = Vec::new();
        assert!(Cluster::new(nodes, "/qlock").is_err());
    }

    #[test]
    fn endpoints_are_normalized() {
        let cluster = Cluster::new(["  10.0.0.1:9320/ ", "10.0.0.2:9320"], "/qlock").unwrap();
        assert_eq!(cluster.endpoint(0), Some("10.0.0.1:9320"));
        assert_eq!(cluster.n(), 2);
    }
}
