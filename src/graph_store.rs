//! Graph database bulk loader
//!
//! Loads GraphRAG's exported tables (entities, relationships, communities)
//! into Neo4j so the knowledge graph can be explored with Cypher. Tables are
//! read as CSV; rows are MERGEd so re-running the loader is idempotent.

use std::path::Path;

use neo4rs::{Graph, query};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// One entity row from `entities.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub human_readable_id: Option<String>,
    #[serde(default)]
    pub degree: Option<i64>,
}

/// One relationship row from `relationships.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipRow {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub human_readable_id: Option<String>,
    #[serde(default)]
    pub combined_degree: Option<i64>,
}

/// One community row from `communities.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct CommunityRow {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
}

/// Per-table row counts from a full load
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadSummary {
    pub entities: usize,
    pub relationships: usize,
    pub communities: usize,
}

/// Graph store backed by Neo4j
pub struct GraphStore {
    graph: Graph,
}

impl GraphStore {
    /// Connect to a Neo4j server
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password).await?;
        info!("Connected to Neo4j at {}", uri);
        Ok(Self { graph })
    }

    /// Connect using `NEO4J_URI`, `NEO4J_USER`, and `NEO4J_PASSWORD`
    pub async fn from_env() -> Result<Self> {
        let uri =
            std::env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://localhost:7687".to_string());
        let user = std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string());
        let password = std::env::var("NEO4J_PASSWORD")
            .map_err(|_| Error::Other("NEO4J_PASSWORD not set".to_string()))?;

        Self::new(&uri, &user, &password).await
    }

    /// Create indexes for the loaded schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing Neo4j schema...");

        let indexes = [
            "CREATE INDEX entity_id IF NOT EXISTS FOR (e:Entity) ON (e.id)",
            "CREATE INDEX entity_name IF NOT EXISTS FOR (e:Entity) ON (e.name)",
            "CREATE INDEX community_id IF NOT EXISTS FOR (c:Community) ON (c.id)",
        ];
        for index in indexes {
            self.graph.run(query(index)).await?;
        }

        info!("Schema initialized");
        Ok(())
    }

    /// Delete every node and relationship. Use with caution.
    pub async fn clear(&self) -> Result<()> {
        self.graph.run(query("MATCH (n) DETACH DELETE n")).await?;
        info!("Database cleared");
        Ok(())
    }

    /// MERGE entity nodes from `entities.csv`
    pub async fn load_entities(&self, path: &Path) -> Result<usize> {
        let rows = read_entities(path)?;
        info!("Loading {} entities from {}", rows.len(), path.display());

        let total = rows.len();
        let mut count = 0;
        for row in rows {
            let q = query(
                "MERGE (e:Entity {id: $id})
                 SET e.name = $name,
                     e.type = $type,
                     e.description = $description,
                     e.human_readable_id = $human_readable_id,
                     e.degree = $degree",
            )
            .param("id", row.id)
            .param("name", row.title)
            .param("type", row.r#type.unwrap_or_else(|| "Unknown".to_string()))
            .param("description", row.description.unwrap_or_default())
            .param("human_readable_id", row.human_readable_id.unwrap_or_default())
            .param("degree", row.degree.unwrap_or(0));

            self.graph.run(q).await?;
            count += 1;
            if count % 100 == 0 {
                info!("Loaded {}/{} entities...", count, total);
            }
        }

        info!("Loaded {} entities", count);
        Ok(count)
    }

    /// MERGE RELATES_TO edges from `relationships.csv`
    ///
    /// Both endpoints must already exist as Entity nodes; edges whose
    /// endpoints are missing are silently skipped by the MATCH.
    pub async fn load_relationships(&self, path: &Path) -> Result<usize> {
        let rows = read_relationships(path)?;
        info!("Loading {} relationships from {}", rows.len(), path.display());

        let total = rows.len();
        let mut count = 0;
        for row in rows {
            let q = query(
                "MATCH (source:Entity {id: $source_id})
                 MATCH (target:Entity {id: $target_id})
                 MERGE (source)-[r:RELATES_TO]->(target)
                 SET r.description = $description,
                     r.weight = $weight,
                     r.human_readable_id = $human_readable_id,
                     r.combined_degree = $combined_degree",
            )
            .param("source_id", row.source)
            .param("target_id", row.target)
            .param("description", row.description.unwrap_or_default())
            .param("weight", row.weight.unwrap_or(1.0))
            .param("human_readable_id", row.human_readable_id.unwrap_or_default())
            .param("combined_degree", row.combined_degree.unwrap_or(0));

            self.graph.run(q).await?;
            count += 1;
            if count % 100 == 0 {
                info!("Loaded {}/{} relationships...", count, total);
            }
        }

        info!("Loaded {} relationships", count);
        Ok(count)
    }

    /// MERGE community nodes from `communities.csv`
    pub async fn load_communities(&self, path: &Path) -> Result<usize> {
        let rows = read_communities(path)?;
        info!("Loading {} communities from {}", rows.len(), path.display());

        let total = rows.len();
        let mut count = 0;
        for row in rows {
            let q = query(
                "MERGE (c:Community {id: $id})
                 SET c.title = $title,
                     c.level = $level,
                     c.size = $size",
            )
            .param("id", row.id)
            .param("title", row.title.unwrap_or_default())
            .param("level", row.level.unwrap_or(0))
            .param("size", row.size.unwrap_or(0));

            self.graph.run(q).await?;
            count += 1;
            if count % 50 == 0 {
                info!("Loaded {}/{} communities...", count, total);
            }
        }

        info!("Loaded {} communities", count);
        Ok(count)
    }

    /// Load all three tables from a GraphRAG output directory
    ///
    /// Missing tables are skipped with a warning, matching a partial
    /// indexing run; schema indexes are created first.
    pub async fn load_all(&self, output_dir: &Path) -> Result<LoadSummary> {
        self.init_schema().await?;

        let mut summary = LoadSummary::default();

        let entities = output_dir.join("entities.csv");
        if entities.exists() {
            summary.entities = self.load_entities(&entities).await?;
        } else {
            warn!("File not found, skipping: {}", entities.display());
        }

        let relationships = output_dir.join("relationships.csv");
        if relationships.exists() {
            summary.relationships = self.load_relationships(&relationships).await?;
        } else {
            warn!("File not found, skipping: {}", relationships.display());
        }

        let communities = output_dir.join("communities.csv");
        if communities.exists() {
            summary.communities = self.load_communities(&communities).await?;
        } else {
            warn!("File not found, skipping: {}", communities.display());
        }

        if summary.entities == 0 {
            warn!("No entities loaded. Make sure GraphRAG indexing completed.");
        }
        debug!(?summary, "load finished");
        Ok(summary)
    }
}

/// Read entity rows from a CSV file
pub fn read_entities(path: &Path) -> Result<Vec<EntityRow>> {
    read_rows(path)
}

/// Read relationship rows from a CSV file
pub fn read_relationships(path: &Path) -> Result<Vec<RelationshipRow>> {
    read_rows(path)
}

/// Read community rows from a CSV file
pub fn read_communities(path: &Path) -> Result<Vec<CommunityRow>> {
    read_rows(path)
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_entity_rows() {
        let file = write_csv(
            "id,human_readable_id,title,type,description,degree\n\
             e1,0,SUN WUKONG,PERSON,The Monkey King,42\n\
             e2,1,JADE EMPEROR,PERSON,Ruler of Heaven,17\n",
        );

        let rows = read_entities(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "e1");
        assert_eq!(rows[0].title, "SUN WUKONG");
        assert_eq!(rows[0].r#type.as_deref(), Some("PERSON"));
        assert_eq!(rows[1].degree, Some(17));
    }

    #[test]
    fn test_missing_optional_columns_default() {
        let file = write_csv("id,title\ne1,SUN WUKONG\n");

        let rows = read_entities(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].r#type.is_none());
        assert!(rows[0].degree.is_none());
    }

    #[test]
    fn test_parse_relationship_rows() {
        let file = write_csv(
            "source,target,description,weight,combined_degree\n\
             e1,e2,defies,7.0,59\n",
        );

        let rows = read_relationships(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, "e1");
        assert_eq!(rows[0].target, "e2");
        assert_eq!(rows[0].weight, Some(7.0));
    }

    #[test]
    fn test_parse_community_rows() {
        let file = write_csv(
            "id,title,level,size\n\
             c1,Heavenly Court,0,12\n\
             c2,,1,\n",
        );

        let rows = read_communities(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title.as_deref(), Some("Heavenly Court"));
        assert_eq!(rows[0].size, Some(12));
        assert_eq!(rows[1].level, Some(1));
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let file = write_csv("title\nSUN WUKONG\n");
        assert!(read_entities(file.path()).is_err());
    }
}
