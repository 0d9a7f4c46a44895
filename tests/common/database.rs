use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::sync::Once;
use uuid::Uuid;
use vetportal::{
    load_config,
    models::{
        clinic::{ClinicService, Veterinarian},
        pets::{Pet, PetDetails},
        users::{NewUser, RegisterUser, User},
    },
    queries,
    services::{appointments::clinic_now, users::hash_password},
};

static INIT: Once = Once::new();

pub const TEST_PASSWORD: &str = "testpassword123";

/// Initialize test database
pub async fn init_test_db() -> PgPool {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
    });

    let config = load_config().expect("Failed to load config");
    let pool = PgPool::connect(config.database.connection_string().expose_secret())
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Removes everything created under `prefix`.
///
/// Users go first: their pets, sessions and appointments cascade, which frees
/// the prefixed veterinarians and services to be deleted afterwards.
async fn cleanup_prefix(pool: &PgPool, prefix: &str) -> Result<(), sqlx::Error> {
    let pattern = format!("{}-%", prefix);
    sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(&pattern)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM appointments WHERE vet_id IN (SELECT id FROM veterinarians WHERE name LIKE $1)")
        .bind(&pattern)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM veterinarians WHERE name LIKE $1")
        .bind(&pattern)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM services WHERE service_name LIKE $1")
        .bind(&pattern)
        .execute(pool)
        .await?;
    Ok(())
}

/// Test database wrapper for better test isolation
pub struct TestDb {
    pub pool: PgPool,
    test_prefix: String,
}

impl TestDb {
    /// Creates a new test database instance with isolated data namespace.
    ///
    /// # Important Rules:
    /// - **ALWAYS use the test function name as `test_name`**
    /// - Users get emails like `"test_<name>-<uuid>@example.com"`; veterinarians
    ///   and services are named with the same prefix
    /// - Automatic cleanup happens when TestDb is dropped
    pub async fn new(test_name: &str) -> Self {
        let pool = init_test_db().await;
        let test_prefix = format!("test_{}", test_name).to_lowercase();

        // Clean up leftovers from an earlier run of the same test
        cleanup_prefix(&pool, &test_prefix)
            .await
            .expect("Failed to cleanup test data");

        Self { pool, test_prefix }
    }

    pub async fn get_connection(&self) -> sqlx::pool::PoolConnection<sqlx::Postgres> {
        self.pool
            .acquire()
            .await
            .expect("Failed to get database connection")
    }

    pub fn test_prefix(&self) -> &str {
        &self.test_prefix
    }

    /// Get a count of users with test prefix
    pub async fn count_test_users(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email LIKE $1")
            .bind(format!("{}-%", self.test_prefix))
            .fetch_one(&self.pool)
            .await
    }

    /// Check if a user exists by email
    pub async fn user_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
    }

    /// Reads the pending verification code straight from the users table
    pub async fn verification_code(&self, email: &str) -> Option<String> {
        sqlx::query_scalar::<_, Option<String>>("SELECT verification_code FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .expect("Failed to read verification code")
            .flatten()
    }

    /// Moves a user's code expiry into the past
    pub async fn expire_verification_code(&self, email: &str) {
        sqlx::query("UPDATE users SET verification_code_expires_at = now() - interval '1 minute' WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("Failed to expire verification code");
    }

    pub async fn count_sessions(&self, user_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count sessions")
    }

    /// Forces an appointment into a status the portal itself never sets
    pub async fn set_appointment_status(&self, appointment_id: Uuid, status: &str) {
        sqlx::query("UPDATE appointments SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(appointment_id)
            .execute(&self.pool)
            .await
            .expect("Failed to set appointment status");
    }

    /// Inserts an appointment directly, bypassing booking validation (e.g. in the past)
    pub async fn insert_appointment_row(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        vet_id: Uuid,
        service_id: Uuid,
        at: NaiveDateTime,
        status: &str,
    ) -> Uuid {
        sqlx::query_scalar(
            r#"
            INSERT INTO appointments (user_id, pet_id, vet_id, service_id, appointment_date, appointment_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(pet_id)
        .bind(vet_id)
        .bind(service_id)
        .bind(at.date())
        .bind(at.time())
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert appointment row")
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Cleanup test data when TestDb is dropped
        let pool = self.pool.clone();
        let prefix = self.test_prefix.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = cleanup_prefix(&pool, &prefix).await;
            });
        }
    }
}

/// Test application wrapper that manages test data creation
pub struct TestApp {
    pub test_db: TestDb,
}

impl TestApp {
    /// Creates a new test app with isolated data namespace
    pub async fn new(test_name: &str) -> Self {
        let test_db = TestDb::new(test_name).await;
        Self { test_db }
    }

    pub async fn get_connection(&self) -> sqlx::pool::PoolConnection<sqlx::Postgres> {
        self.test_db.get_connection().await
    }

    pub fn test_prefix(&self) -> &str {
        self.test_db.test_prefix()
    }

    /// Generate a unique test email with proper prefix
    pub fn generate_test_email(&self) -> String {
        let id = Uuid::now_v7().simple().to_string();
        format!("{}-{}@example.com", self.test_prefix(), &id[20..])
    }

    /// Usernames are capped at 32 characters, so they only carry a random suffix
    pub fn generate_test_username(&self) -> String {
        let id = Uuid::now_v7().simple().to_string();
        format!("u_{}", &id[id.len() - 24..])
    }

    /// Generate a unique registration payload
    pub fn generate_test_user(&self) -> RegisterUser {
        RegisterUser {
            name: "Test Owner".to_string(),
            username: self.generate_test_username(),
            email: self.generate_test_email(),
            password: TEST_PASSWORD.to_string(),
        }
    }

    /// Creates a user directly in the database
    pub async fn create_user(&self, verified: bool) -> User {
        let mut conn = self.get_connection().await;
        let register = self.generate_test_user();

        let user = queries::users::create_user(
            &mut conn,
            NewUser {
                name: register.name,
                username: register.username,
                email: register.email.clone(),
                password_hash: hash_password(TEST_PASSWORD).expect("Failed to hash password"),
                verification_code: "123456".to_string(),
                verification_code_expires_at: Utc::now() + Duration::minutes(30),
            },
        )
        .await
        .expect("Failed to create test user");

        if !verified {
            return user;
        }

        assert!(
            queries::users::verify_user(&mut conn, &register.email, "123456")
                .await
                .expect("Failed to verify test user")
        );
        queries::users::get_user_by_id(&mut conn, user.id)
            .await
            .expect("Failed to reload test user")
            .expect("Test user disappeared")
    }

    pub async fn create_pet(&self, user_id: Uuid, name: &str) -> Pet {
        let mut conn = self.get_connection().await;
        queries::pets::create_pet(
            &mut conn,
            user_id,
            &PetDetails {
                name: name.to_string(),
                species: "Dog".to_string(),
                breed: "Aspin".to_string(),
                birthdate: NaiveDate::from_ymd_opt(2022, 3, 14),
                vaccinated: true,
                medical_history: None,
            },
        )
        .await
        .expect("Failed to create test pet")
    }

    /// Creates a service and a veterinarian specialised in it
    pub async fn create_vet_with_service(&self, label: &str, is_active: bool) -> (Veterinarian, ClinicService) {
        let suffix = Uuid::now_v7().simple();
        let service_name = format!("{}-{}-{}", self.test_prefix(), label, suffix);

        let service = sqlx::query_as::<_, ClinicService>(
            r#"
            INSERT INTO services (service_name, fee, description)
            VALUES ($1, 500, 'Test service')
            RETURNING id, service_name, fee, description
            "#,
        )
        .bind(&service_name)
        .fetch_one(&self.test_db.pool)
        .await
        .expect("Failed to create test service");

        let vet = sqlx::query_as::<_, Veterinarian>(
            r#"
            INSERT INTO veterinarians (name, specialization, contact, is_active)
            VALUES ($1, $2, '555-0100', $3)
            RETURNING id, name, specialization, contact, is_active, created_at
            "#,
        )
        .bind(format!("{}-vet-{}-{}", self.test_prefix(), label, suffix))
        .bind(&service_name)
        .bind(is_active)
        .fetch_one(&self.test_db.pool)
        .await
        .expect("Failed to create test veterinarian");

        (vet, service)
    }

    /// A date comfortably in the future for booking
    pub fn future_date(&self, days_ahead: i64) -> NaiveDate {
        clinic_now().date() + Duration::days(days_ahead)
    }
}
