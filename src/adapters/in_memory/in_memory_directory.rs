// In memory implementation of the device and employee directories.
//
// Purpose
// - Support pipeline tests and local development without a database.
//
// Responsibilities
// - Hold seeded devices and employees and answer tenant-scoped lookups.

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::ports::{DeviceDirectory, DirectoryError, EmployeeDirectory};
use crate::core::punch::{Device, Employee};

#[derive(Default)]
pub struct InMemoryDirectory {
    devices: RwLock<Vec<Device>>,
    employees: RwLock<Vec<Employee>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_device(&self, device: Device) {
        self.devices.write().await.push(device);
    }

    pub async fn add_employee(&self, employee: Employee) {
        self.employees.write().await.push(employee);
    }
}

#[async_trait::async_trait]
impl DeviceDirectory for InMemoryDirectory {
    async fn find_device(
        &self,
        tenant_id: Uuid,
        device_id: Uuid,
    ) -> Result<Option<Device>, DirectoryError> {
        let guard = self.devices.read().await;
        Ok(guard
            .iter()
            .find(|d| d.id == device_id && d.tenant_id == tenant_id)
            .cloned())
    }
}

#[async_trait::async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn find_by_enrollment(
        &self,
        tenant_id: Uuid,
        enrollment_id: &str,
    ) -> Result<Option<Employee>, DirectoryError> {
        let guard = self.employees.read().await;
        Ok(guard
            .iter()
            .find(|e| e.tenant_id == tenant_id && e.enrollment_id == enrollment_id)
            .cloned())
    }
}
