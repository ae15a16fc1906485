/// A registered company. Rows are created on register and only read afterwards.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Company {
    pub id: i64,
    #[sqlx(rename = "nombre_empresa")]
    pub name: String,
    pub password_hash: String,
}
