use crate::error::ApiError;
use common::model::company::{CompanyInformation, CompanyRole, CompanyRoleAssignment};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub fn save_company(conn: &Connection, company: &CompanyInformation) -> Result<(), ApiError> {
    conn.execute(
        "INSERT OR REPLACE INTO companies (company_id, company_name, headquarters) VALUES (?1, ?2, ?3)",
        params![company.company_id, company.company_name, company.headquarters],
    )?;
    Ok(())
}

pub fn find_company(conn: &Connection, company_id: &str) -> Result<Option<CompanyInformation>, ApiError> {
    Ok(conn
        .query_row(
            "SELECT company_id, company_name, headquarters FROM companies WHERE company_id = ?1",
            params![company_id],
            |row| {
                Ok(CompanyInformation {
                    company_id: row.get(0)?,
                    company_name: row.get(1)?,
                    headquarters: row.get(2)?,
                })
            },
        )
        .optional()?)
}

pub fn save_role_assignment(
    conn: &Connection,
    assignment: &CompanyRoleAssignment,
) -> Result<(), ApiError> {
    conn.execute(
        "INSERT OR REPLACE INTO company_roles (company_id, user_id, company_role) VALUES (?1, ?2, ?3)",
        params![
            assignment.company_id,
            assignment.user_id,
            assignment.company_role.as_str()
        ],
    )?;
    Ok(())
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<Option<CompanyRoleAssignment>> {
    let company_id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let role: String = row.get(2)?;
    Ok(CompanyRole::parse(&role).map(|company_role| CompanyRoleAssignment {
        company_role,
        company_id,
        user_id,
    }))
}

pub fn find_role_assignments(
    conn: &Connection,
    user_id: Option<&str>,
    company_id: Option<&str>,
) -> Result<Vec<CompanyRoleAssignment>, ApiError> {
    let mut stmt = conn.prepare(
        "SELECT company_id, user_id, company_role FROM company_roles \
         WHERE (?1 IS NULL OR user_id = ?1) AND (?2 IS NULL OR company_id = ?2) \
         ORDER BY company_id, user_id",
    )?;
    let rows = stmt.query_map(params![user_id, company_id], assignment_from_row)?;
    let mut assignments = Vec::new();
    for row in rows {
        if let Some(assignment) = row? {
            assignments.push(assignment);
        }
    }
    Ok(assignments)
}
