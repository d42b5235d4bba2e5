// スキーマ依存関係解決
//
// 外部キー参照から依存関係グラフを構築し、
// テーブルの作成順・削除順をトポロジカルソートで決定します。

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::core::error::DdlError;
use crate::core::schema::{Schema, Table};

/// 外部キー依存関係グラフ
///
/// ノードはDDL生成対象のテーブル（abstract・skipを除く）で、記述順のインデックスを持ちます。
/// 辺 `A -> B` は「AはBの後に作成する必要がある」ことを表します。
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    /// ノード（記述順）
    nodes: Vec<&'a Table>,
    /// ノードごとの依存先インデックス
    dependencies: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    /// スキーマから依存関係グラフを構築
    ///
    /// 自己参照と、ノード集合に含まれないテーブルへの参照は辺になりません。
    pub fn build(schema: &'a Schema) -> Self {
        let nodes: Vec<&Table> = schema.generated_tables().collect();
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.as_str(), i))
            .collect();

        let dependencies = nodes
            .iter()
            .enumerate()
            .map(|(i, table)| {
                let mut deps = Vec::new();
                for referenced in table.referenced_tables() {
                    match index.get(referenced) {
                        Some(&j) if j != i => deps.push(j),
                        Some(_) => {}
                        None => debug!(
                            table = %table.name,
                            referenced = %referenced,
                            "Reference outside generated tables is not ordered"
                        ),
                    }
                }
                deps
            })
            .collect();

        Self {
            nodes,
            dependencies,
        }
    }

    /// ノード数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// ノードが空かどうか
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// ノードのテーブル名（記述順）
    pub fn node_names(&self) -> Vec<&'a str> {
        self.nodes.iter().map(|t| t.name.as_str()).collect()
    }

    /// 指定テーブルの依存先テーブル名
    pub fn dependencies_of(&self, table_name: &str) -> Option<Vec<&'a str>> {
        let i = self.nodes.iter().position(|t| t.name == table_name)?;
        Some(
            self.dependencies[i]
                .iter()
                .map(|&j| self.nodes[j].name.as_str())
                .collect(),
        )
    }

    /// Kahnのアルゴリズムによるトポロジカルソート
    ///
    /// 依存先が先に来るように並び替えます。
    /// 同時に処理可能なノードが複数ある場合は記述順の早いものを優先します。
    pub fn topological_order(&self) -> Result<Vec<&'a Table>, DdlError> {
        let n = self.nodes.len();

        // 入次数 = 未処理の依存先の数
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();

        // 逆辺: 依存先 -> 依存元
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, deps) in self.dependencies.iter().enumerate() {
            for &j in deps {
                dependents[j].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut sorted = Vec::with_capacity(n);

        while let Some(i) = ready.pop_first() {
            sorted.push(self.nodes[i]);
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if sorted.len() < n {
            let remaining: Vec<usize> = (0..n).filter(|&i| in_degree[i] > 0).collect();
            return Err(DdlError::SchemaCycle {
                tables: self.cycle_members(&remaining),
            });
        }

        Ok(sorted)
    }

    /// 未解決ノードから循環に属するテーブルを抽出
    ///
    /// 未解決ノード上の強連結成分（Tarjan）のうち、2ノード以上のものだけを循環とみなします。
    /// 循環にぶら下がる依存元や、循環同士を橋渡しするだけのノードは含みません。
    fn cycle_members(&self, remaining: &[usize]) -> Vec<String> {
        let n = self.nodes.len();
        let mut in_scope = vec![false; n];
        for &i in remaining {
            in_scope[i] = true;
        }

        let mut state = TarjanState::new(n);
        for &i in remaining {
            if state.index[i].is_none() {
                self.strong_connect(i, &in_scope, &mut state);
            }
        }

        state
            .members
            .into_iter()
            .map(|i| self.nodes[i].name.clone())
            .collect()
    }

    fn strong_connect(&self, v: usize, in_scope: &[bool], state: &mut TarjanState) {
        let index = state.next;
        state.index[v] = Some(index);
        state.low[v] = index;
        state.next += 1;
        state.stack.push(v);
        state.on_stack[v] = true;

        for &w in &self.dependencies[v] {
            if !in_scope[w] {
                continue;
            }
            match state.index[w] {
                None => {
                    self.strong_connect(w, in_scope, state);
                    state.low[v] = state.low[v].min(state.low[w]);
                }
                Some(w_index) if state.on_stack[w] => {
                    state.low[v] = state.low[v].min(w_index);
                }
                Some(_) => {}
            }
        }

        if state.low[v] == index {
            let mut component = Vec::new();
            while let Some(w) = state.stack.pop() {
                state.on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            if component.len() > 1 {
                state.members.extend(component);
            }
        }
    }
}

/// 強連結成分探索の作業領域
struct TarjanState {
    index: Vec<Option<usize>>,
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next: usize,
    /// 循環に属するノード（記述順）
    members: BTreeSet<usize>,
}

impl TarjanState {
    fn new(n: usize) -> Self {
        Self {
            index: vec![None; n],
            low: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next: 0,
            members: BTreeSet::new(),
        }
    }
}

/// テーブルの作成順を解決
///
/// 全てのテーブルは、参照している全てのテーブルより後に並びます。
/// 循環参照がある場合は `DdlError::SchemaCycle` を返します。
pub fn resolve_creation_order(schema: &Schema) -> Result<Vec<&Table>, DdlError> {
    let order = DependencyGraph::build(schema).topological_order()?;
    debug!(
        schema = %schema.name,
        order = ?order.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "Resolved creation order"
    );
    Ok(order)
}

/// テーブルの削除・TRUNCATE順を解決
///
/// 作成順の逆順で、参照元テーブルが先に処理されます。
pub fn resolve_truncation_order(schema: &Schema) -> Result<Vec<&Table>, DdlError> {
    let mut order = resolve_creation_order(schema)?;
    order.reverse();
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Column, ColumnType, Constraint};

    fn table_referencing(name: &str, targets: &[&str]) -> Table {
        let mut table = Table::new(name);
        for target in targets {
            table.add_constraint(Constraint::FOREIGN_KEY {
                columns: vec![format!("{}_id", target)],
                referenced_table: target.to_string(),
                referenced_columns: vec!["id".to_string()],
                on_delete: None,
                on_update: None,
            });
        }
        table
    }

    fn names<'a>(tables: &[&'a Table]) -> Vec<&'a str> {
        tables.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_no_dependencies_keeps_declaration_order() {
        let mut schema = Schema::new("s");
        schema.add_table(Table::new("posts"));
        schema.add_table(Table::new("users"));
        schema.add_table(Table::new("audit"));

        let order = resolve_creation_order(&schema).unwrap();
        assert_eq!(names(&order), vec!["posts", "users", "audit"]);
    }

    #[test]
    fn test_reverse_declared_chain() {
        let mut schema = Schema::new("shop");
        schema.add_table(table_referencing("order_item", &["order"]));
        schema.add_table(table_referencing("order", &["customer"]));
        schema.add_table(Table::new("customer"));

        let order = resolve_creation_order(&schema).unwrap();
        assert_eq!(names(&order), vec!["customer", "order", "order_item"]);

        let truncation = resolve_truncation_order(&schema).unwrap();
        assert_eq!(names(&truncation), vec!["order_item", "order", "customer"]);
    }

    #[test]
    fn test_inline_column_reference_creates_edge() {
        let mut schema = Schema::new("s");
        let mut posts = Table::new("posts");
        posts.add_column(
            Column::new("author_id", ColumnType::integer(4), false).references("users", "id"),
        );
        schema.add_table(posts);
        schema.add_table(Table::new("users"));

        let order = resolve_creation_order(&schema).unwrap();
        assert_eq!(names(&order), vec!["users", "posts"]);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let mut schema = Schema::new("s");
        schema.add_table(table_referencing("employee", &["employee"]));

        let order = resolve_creation_order(&schema).unwrap();
        assert_eq!(names(&order), vec!["employee"]);
    }

    #[test]
    fn test_abstract_and_skip_tables_are_excluded() {
        let mut schema = Schema::new("s");
        let mut base = Table::new("base");
        base.is_abstract = true;
        let mut legacy = Table::new("legacy");
        legacy.skip = true;
        schema.add_table(base);
        schema.add_table(legacy);
        schema.add_table(table_referencing("users", &["legacy"]));

        let order = resolve_creation_order(&schema).unwrap();
        assert_eq!(names(&order), vec!["users"]);
    }

    #[test]
    fn test_mutual_cycle_is_an_error() {
        let mut schema = Schema::new("s");
        schema.add_table(table_referencing("a", &["b"]));
        schema.add_table(table_referencing("b", &["a"]));

        let err = resolve_creation_order(&schema).unwrap_err();
        assert_eq!(
            err,
            DdlError::SchemaCycle {
                tables: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn test_cycle_report_excludes_dependents() {
        let mut schema = Schema::new("s");
        schema.add_table(table_referencing("leaf", &["b"]));
        schema.add_table(table_referencing("a", &["c"]));
        schema.add_table(table_referencing("b", &["a"]));
        schema.add_table(table_referencing("c", &["b"]));
        schema.add_table(Table::new("free"));

        let err = resolve_creation_order(&schema).unwrap_err();
        match err {
            DdlError::SchemaCycle { tables } => assert_eq!(tables, vec!["a", "b", "c"]),
            other => panic!("Expected SchemaCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_report_excludes_bridge_between_cycles() {
        let mut schema = Schema::new("s");
        schema.add_table(table_referencing("a", &["b"]));
        schema.add_table(table_referencing("b", &["a"]));
        schema.add_table(table_referencing("x", &["a"]));
        schema.add_table(table_referencing("c", &["d", "x"]));
        schema.add_table(table_referencing("d", &["c"]));

        let err = resolve_creation_order(&schema).unwrap_err();
        match err {
            DdlError::SchemaCycle { tables } => assert_eq!(tables, vec!["a", "b", "c", "d"]),
            other => panic!("Expected SchemaCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_every_edge_points_backwards() {
        let mut schema = Schema::new("s");
        schema.add_table(table_referencing("e", &["c", "d"]));
        schema.add_table(table_referencing("d", &["a"]));
        schema.add_table(table_referencing("c", &["a", "b"]));
        schema.add_table(Table::new("b"));
        schema.add_table(Table::new("a"));

        let order = resolve_creation_order(&schema).unwrap();
        let position = |name: &str| order.iter().position(|t| t.name == name).unwrap();
        for table in &schema.tables {
            for referenced in table.referenced_tables() {
                assert!(position(referenced) < position(&table.name));
            }
        }
        assert_eq!(names(&order), vec!["b", "a", "d", "c", "e"]);
    }

    #[test]
    fn test_graph_introspection() {
        let mut schema = Schema::new("s");
        schema.add_table(table_referencing("posts", &["users", "external"]));
        schema.add_table(Table::new("users"));

        let graph = DependencyGraph::build(&schema);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node_names(), vec!["posts", "users"]);
        assert_eq!(graph.dependencies_of("posts"), Some(vec!["users"]));
        assert_eq!(graph.dependencies_of("missing"), None);
    }
}
