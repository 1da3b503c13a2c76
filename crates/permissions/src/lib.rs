//! # Nebula Permissions
//!
//! The Company → Project → Workflow permission service (C11, §4.10):
//! effective role resolution that cascades explicit membership up the
//! ownership hierarchy, with creator grants taking the highest role.

use dashmap::DashMap;
use nebula_core::{OrganizationId, ProjectId, Role, UserId, WorkflowId};

/// The kind of resource a permission check is against. Ownership
/// cascades `Workflow → Project → Company` (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Company,
    Project,
    Workflow,
}

/// Opaque resource identifier, scoped by [`ResourceType`]. Carries the
/// concrete typed id so the hierarchy lookups stay type-safe at their
/// call sites while this map can still be keyed generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Company(OrganizationId),
    Project(ProjectId),
    Workflow(WorkflowId),
}

impl ResourceId {
    #[must_use]
    pub fn resource_type(self) -> ResourceType {
        match self {
            ResourceId::Company(_) => ResourceType::Company,
            ResourceId::Project(_) => ResourceType::Project,
            ResourceId::Workflow(_) => ResourceType::Workflow,
        }
    }
}

/// Maintains the ownership hierarchy (which project a workflow belongs
/// to, which company a project belongs to) and the creator of each
/// resource, used to grant the owner role without an explicit membership
/// row (§4.10 "creator-of-resource grants the highest role").
#[derive(Default)]
pub struct PermissionService {
    memberships: DashMap<(UserId, ResourceId), Role>,
    creators: DashMap<ResourceId, UserId>,
    project_company: DashMap<ProjectId, OrganizationId>,
    workflow_project: DashMap<WorkflowId, ProjectId>,
}

impl PermissionService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_creator(&self, resource_id: ResourceId, user_id: UserId) {
        self.creators.insert(resource_id, user_id);
    }

    pub fn grant(&self, user_id: UserId, resource_id: ResourceId, role: Role) {
        self.memberships.insert((user_id, resource_id), role);
    }

    pub fn set_project_company(&self, project_id: ProjectId, company_id: OrganizationId) {
        self.project_company.insert(project_id, company_id);
    }

    pub fn set_workflow_project(&self, workflow_id: WorkflowId, project_id: ProjectId) {
        self.workflow_project.insert(workflow_id, project_id);
    }

    fn ancestors(&self, resource_id: ResourceId) -> Vec<ResourceId> {
        let mut chain = vec![resource_id];
        match resource_id {
            ResourceId::Workflow(workflow_id) => {
                if let Some(project_id) = self.workflow_project.get(&workflow_id).map(|p| *p) {
                    chain.extend(self.ancestors(ResourceId::Project(project_id)));
                }
            }
            ResourceId::Project(project_id) => {
                if let Some(company_id) = self.project_company.get(&project_id).map(|c| *c) {
                    chain.push(ResourceId::Company(company_id));
                }
            }
            ResourceId::Company(_) => {}
        }
        chain
    }

    /// Effective role over `(user_id, resource_id)`: the creator grant, if
    /// any, otherwise the highest explicit membership found on the
    /// resource itself or any ancestor owning it (§4.10).
    #[must_use]
    pub fn effective_role(&self, user_id: UserId, resource_id: ResourceId) -> Option<Role> {
        if self.creators.get(&resource_id).map(|c| *c) == Some(user_id) {
            return Some(Role::Owner);
        }

        self.ancestors(resource_id).into_iter().filter_map(|rid| self.memberships.get(&(user_id, rid)).map(|r| *r)).max()
    }

    /// `CanAccess(userId, resourceType, resourceId, minRole)` (§4.10).
    #[must_use]
    pub fn can_access(&self, user_id: UserId, resource_id: ResourceId, min_role: Role) -> bool {
        self.effective_role(user_id, resource_id).is_some_and(|role| role.at_least(min_role))
    }
}
