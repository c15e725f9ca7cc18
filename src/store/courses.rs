use super::mutate::{
    apply_create, apply_hard_delete, apply_restore, apply_soft_delete, apply_update, find, mode_of,
};
use super::ReplicaStore;
use crate::error::StoreError;
use crate::model::{Course, RecordStatus, Schedule, ScheduleException, SchoolDay};
use crate::remote::EntityKind;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub name: String,
    pub grade: String,
    #[serde(default)]
    pub teacher_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_ids: Option<Vec<i64>>,
}

impl CoursePatch {
    fn apply(&self, row: &mut Course) {
        if let Some(name) = &self.name {
            row.name = name.clone();
        }
        if let Some(grade) = &self.grade {
            row.grade = grade.clone();
        }
        if let Some(ids) = &self.teacher_ids {
            row.teacher_ids = ids.clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub status: Option<RecordStatus>,
    pub teacher_id: Option<i64>,
}

/// Weekly slot, upserted by (course, weekday) so the store never produces the
/// duplicate rows the data model tolerates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    pub course_id: i64,
    pub weekday: SchoolDay,
    pub in_time: NaiveTime,
    pub out_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewException {
    pub date: NaiveDate,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub in_time: Option<NaiveTime>,
    #[serde(default)]
    pub out_time: Option<NaiveTime>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ReplicaStore {
    pub fn courses(&self, filter: &CourseFilter) -> Vec<Course> {
        self.snapshot
            .courses
            .iter()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| {
                filter
                    .teacher_id
                    .map_or(true, |tid| c.teacher_ids.contains(&tid))
            })
            .cloned()
            .collect()
    }

    pub fn course(&self, id: i64) -> Option<&Course> {
        find(&self.snapshot.courses, id)
    }

    fn check_teachers(&self, teacher_ids: &[i64]) -> Result<(), StoreError> {
        for tid in teacher_ids {
            if find(&self.snapshot.teachers, *tid).is_none() {
                return Err(StoreError::invalid(format!("teacher {tid} not found")));
            }
        }
        Ok(())
    }

    pub fn add_course(&mut self, new: NewCourse) -> Result<Course, StoreError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::invalid("course name must not be empty"));
        }
        self.check_teachers(&new.teacher_ids)?;
        let draft = Course {
            id: 0,
            name,
            grade: new.grade,
            status: RecordStatus::Active,
            teacher_ids: new.teacher_ids,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(mode, EntityKind::Course, &mut self.snapshot.courses, draft)?;
        self.persist()?;
        Ok(saved)
    }

    pub fn update_course(&mut self, id: i64, patch: CoursePatch) -> Result<Course, StoreError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(StoreError::invalid("course name must not be empty"));
            }
        }
        if let Some(ids) = &patch.teacher_ids {
            self.check_teachers(ids)?;
        }
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_update(
            mode,
            EntityKind::Course,
            &mut self.snapshot.courses,
            id,
            &patch,
            |row, p| p.apply(row),
        )?;
        self.persist()?;
        Ok(saved)
    }

    /// Status flip, and only for empty courses: the enrolled-students guard
    /// runs before any remote call is attempted.
    pub fn delete_course(&mut self, id: i64) -> Result<Course, StoreError> {
        if self
            .snapshot
            .students
            .iter()
            .any(|s| s.course_id == Some(id))
        {
            return Err(StoreError::invalid(
                "course still has enrolled students; move them first",
            ));
        }
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_soft_delete(
            mode,
            EntityKind::Course,
            &mut self.snapshot.courses,
            id,
            |c| c.status = RecordStatus::Deleted,
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn restore_course(&mut self, id: i64) -> Result<Course, StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_restore(
            mode,
            EntityKind::Course,
            &mut self.snapshot.courses,
            id,
            |c| c.status = RecordStatus::Active,
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn schedules_for_course(&self, course_id: i64) -> Vec<Schedule> {
        self.snapshot
            .schedules
            .iter()
            .filter(|s| s.course_id == course_id)
            .cloned()
            .collect()
    }

    pub fn set_schedule(&mut self, slot: ScheduleSlot) -> Result<Schedule, StoreError> {
        if find(&self.snapshot.courses, slot.course_id).is_none() {
            return Err(StoreError::invalid(format!(
                "course {} not found",
                slot.course_id
            )));
        }
        if slot.in_time >= slot.out_time {
            return Err(StoreError::invalid("in-time must be before out-time"));
        }
        let existing_id = self
            .snapshot
            .schedules
            .iter()
            .find(|s| s.course_id == slot.course_id && s.weekday == slot.weekday)
            .map(|s| s.id);
        let mode = mode_of(&self.api, &self.session.token);
        let saved = match existing_id {
            Some(id) => apply_update(
                mode,
                EntityKind::Schedule,
                &mut self.snapshot.schedules,
                id,
                &slot,
                |row, s| {
                    row.in_time = s.in_time;
                    row.out_time = s.out_time;
                },
            )?,
            None => apply_create(
                mode,
                EntityKind::Schedule,
                &mut self.snapshot.schedules,
                Schedule {
                    id: 0,
                    course_id: slot.course_id,
                    weekday: slot.weekday,
                    in_time: slot.in_time,
                    out_time: slot.out_time,
                },
            )?,
        };
        self.persist()?;
        Ok(saved)
    }

    pub fn delete_schedule(&mut self, id: i64) -> Result<(), StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        apply_hard_delete(mode, EntityKind::Schedule, &mut self.snapshot.schedules, id)?;
        self.persist()
    }

    pub fn schedule_exceptions(&self, date: Option<NaiveDate>) -> Vec<ScheduleException> {
        self.snapshot
            .schedule_exceptions
            .iter()
            .filter(|e| date.map_or(true, |d| e.date == d))
            .cloned()
            .collect()
    }

    pub fn add_schedule_exception(
        &mut self,
        new: NewException,
    ) -> Result<ScheduleException, StoreError> {
        if let Some(cid) = new.course_id {
            if find(&self.snapshot.courses, cid).is_none() {
                return Err(StoreError::invalid(format!("course {cid} not found")));
            }
        }
        // No in-time means a closed day; a closed day has no out-time either.
        if new.in_time.is_none() && new.out_time.is_some() {
            return Err(StoreError::invalid(
                "an exception without an in-time cannot carry an out-time",
            ));
        }
        if let (Some(i), Some(o)) = (new.in_time, new.out_time) {
            if i >= o {
                return Err(StoreError::invalid("in-time must be before out-time"));
            }
        }
        let draft = ScheduleException {
            id: 0,
            date: new.date,
            course_id: new.course_id,
            in_time: new.in_time,
            out_time: new.out_time,
            reason: new.reason,
        };
        let mode = mode_of(&self.api, &self.session.token);
        let saved = apply_create(
            mode,
            EntityKind::ScheduleException,
            &mut self.snapshot.schedule_exceptions,
            draft,
        )?;
        self.persist()?;
        Ok(saved)
    }

    pub fn delete_schedule_exception(&mut self, id: i64) -> Result<(), StoreError> {
        let mode = mode_of(&self.api, &self.session.token);
        apply_hard_delete(
            mode,
            EntityKind::ScheduleException,
            &mut self.snapshot.schedule_exceptions,
            id,
        )?;
        self.persist()
    }
}
