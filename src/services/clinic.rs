use crate::DbConn;
use crate::{
    error::Result,
    models::clinic::{ClinicService, Veterinarian},
    queries::clinic,
};

/// All veterinarians, active ones listed first.
pub async fn list_veterinarians(conn: &mut DbConn) -> Result<Vec<Veterinarian>> {
    clinic::list_veterinarians(conn).await
}

/// Veterinarians offered on the booking form.
pub async fn list_bookable_veterinarians(conn: &mut DbConn) -> Result<Vec<Veterinarian>> {
    clinic::list_active_veterinarians(conn).await
}

pub async fn list_services(conn: &mut DbConn) -> Result<Vec<ClinicService>> {
    clinic::list_services(conn).await
}
