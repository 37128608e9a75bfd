/// Products connection query with cursor pagination
///
/// Variables: `$first` (Int!), `$after` (String, nullable).
pub const PRODUCTS_QUERY: &str = r#"
query FetchProducts($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    edges {
      cursor
      node {
        id
        title
        updatedAt
      }
    }
    pageInfo {
      hasNextPage
    }
  }
}
"#;
